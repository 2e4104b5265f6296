//! folio's main application entry point.
//! Parses the command line and dispatches to generation, local running or
//! deployment. This is the only place where errors are reported to the user.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use folio::{
    cli::{get_args, Args, Commands},
    config::get_config,
    config::access_token,
    error::default_error_handler,
    generator::{ensure_output_dir, generate_portfolio},
    github::GitHubClient,
    loader::load_template,
    logger::init_logger,
    process::{request_stop, stop_requested},
    prompt::{DialoguerPrompter, Prompter},
    publisher::{identity_from_settings, DeployPlan, Publisher},
    renderer::MiniJinjaRenderer,
    runner::{run_portfolio, Mode, RunOptions},
    user_data::UserData,
    vcs::GitCli,
};
use log::{info, warn};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(format!("{err:#}"));
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Commands::Generate { template, output_dir, data, force, skip_overwrite_check } => {
            generate(&template, &output_dir, &data, force, skip_overwrite_check)
        }
        Commands::Run { project_dir, port, dev } => serve(&project_dir, port, dev),
        Commands::Deploy { project_dir, data, repository, branch, private, yes } => {
            deploy(&project_dir, &data, repository, branch, private, yes)
        }
    }
}

fn generate(
    template: &str,
    output_dir: &Path,
    data: &Path,
    force: bool,
    skip_overwrite_check: bool,
) -> anyhow::Result<()> {
    let prompt = DialoguerPrompter::new();

    let output_root = ensure_output_dir(output_dir, force)?;
    let user_data = UserData::load(data)
        .with_context(|| format!("failed to load user data from '{}'", data.display()))?;

    let work_dir = std::env::temp_dir().join("folio-templates");
    std::fs::create_dir_all(&work_dir)?;
    let template_root = load_template(&prompt, template, &work_dir, skip_overwrite_check)?;

    let report = generate_portfolio(&template_root, &output_root, &user_data)
        .context("portfolio generation failed")?;

    for missing in &report.injected.missing {
        warn!("'{}' was not found in {}", missing.anchor, missing.file.display());
    }
    println!(
        "Portfolio generated in {} ({} files, {} rewritten).",
        report.output_root.display(),
        report.copied.files,
        report.substituted.rewritten.len()
    );
    Ok(())
}

fn serve(project_dir: &Path, port: Option<u16>, dev: bool) -> anyhow::Result<()> {
    let engine = MiniJinjaRenderer::new();
    let config = get_config(project_dir)?;
    let mode = if dev { Mode::Development } else { Mode::Production };
    let options = RunOptions::from_settings(&config.runner, &engine, port, mode)?;

    stop_on_ctrl_c()?;
    let mut handle = run_portfolio(project_dir, &options)?;
    println!("Portfolio is running at: {} (Ctrl-C to stop)", handle.url());

    loop {
        if let Some(status) = handle.try_wait()? {
            return Err(anyhow!("server exited with {status}"));
        }
        if stop_requested() {
            info!("Stopping server...");
            handle.stop()?;
            return Ok(());
        }
        thread::sleep(Duration::from_millis(200));
    }
}

/// Routes Ctrl-C to the stop flag polled by every child-process wait.
fn stop_on_ctrl_c() -> anyhow::Result<()> {
    ctrlc::set_handler(request_stop).context("failed to install Ctrl-C handler")
}

fn deploy(
    project_dir: &Path,
    data: &Path,
    repository: Option<String>,
    branch: Option<String>,
    private: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let engine = MiniJinjaRenderer::new();
    let prompt = DialoguerPrompter::new();

    let user_data = UserData::load(data)
        .with_context(|| format!("failed to load user data from '{}'", data.display()))?;
    let mut settings = get_config(project_dir)?.deploy;
    if repository.is_some() {
        settings.repository = repository;
    }
    if let Some(branch) = branch {
        settings.branch = branch;
    }
    settings.private |= private;

    let settings = settings.render(&engine, &user_data)?;
    let plan = DeployPlan::from_settings(&settings)?;

    let confirmed = prompt.confirm(
        yes,
        format!(
            "Create {} repository '{}' and publish {}?",
            if plan.private { "private" } else { "public" },
            plan.repository,
            project_dir.display()
        ),
    )?;
    if !confirmed {
        println!("Deployment cancelled.");
        return Ok(());
    }

    let token = access_token(&settings.token_env)?;
    stop_on_ctrl_c()?;
    let api = GitHubClient::new(&settings.api_url, token)?;
    let git = GitCli::new(plan.command_timeout).with_identity(identity_from_settings(&settings));

    let deployment = Publisher::new(&api, &git).deploy_portfolio(project_dir, &plan)?;
    println!("Repository: {}", deployment.repository.html_url);
    println!("Clone URL: {}", deployment.repository.clone_url);
    println!("Your portfolio is live at: {}", deployment.pages_url);
    Ok(())
}
