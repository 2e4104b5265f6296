use folio::error::Error;
use folio::generator::{ensure_output_dir, generate_portfolio};
use folio::user_data::UserData;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn template() -> TempDir {
    let root = TempDir::new().unwrap();
    write(root.path(), "index.ejs", "Hello {name}, skills: {skills}");
    write(
        root.path(),
        "src/App.ejs",
        "const App = () => {\n  return <><Hero /><About /><Navbar /><Projects /><Clients /><WorkExperience /><Contact /><Footer /></>;\n};\n",
    );
    write(root.path(), "src/main.jsx", "root.render(<App />);\n");
    write(root.path(), "src/components/Hero.ejs", "<h1>{name}</h1><p>{about}</p>");
    write(root.path(), "package.json", "{\"name\": \"{name}\"}");
    write(root.path(), "public/favicon.svg", "<svg/>");
    root
}

#[test_log::test]
fn test_generate_scenario() {
    let template = template();
    let output = TempDir::new().unwrap();
    let target = output.path().join("ada");
    let data = UserData::new().with("name", "Ada").with("skills", "Rust");

    let report = generate_portfolio(template.path(), &target, &data).unwrap();

    assert_eq!(fs::read_to_string(target.join("index.jsx")).unwrap(), "Hello Ada, skills: Rust");
    assert!(!target.join("index.ejs").exists());
    assert_eq!(
        fs::read_to_string(target.join("src/components/Hero.jsx")).unwrap(),
        "<h1>Ada</h1><p>Default About Text</p>"
    );
    assert!(report.injected.missing.is_empty());
    assert_eq!(report.substituted.rewritten.len(), 3);

    let main = fs::read_to_string(target.join("src/main.jsx")).unwrap();
    assert_eq!(main, "root.render(<App userData={{\"name\":\"Ada\",\"skills\":\"Rust\"}} />);\n");
}

#[test]
fn test_other_files_are_byte_identical() {
    let template = template();
    let output = TempDir::new().unwrap();
    generate_portfolio(template.path(), output.path(), &UserData::new()).unwrap();

    for untouched in ["package.json", "public/favicon.svg"] {
        assert_eq!(
            fs::read(template.path().join(untouched)).unwrap(),
            fs::read(output.path().join(untouched)).unwrap()
        );
    }
}

#[test]
fn test_template_is_not_mutated() {
    let template = template();
    let output = TempDir::new().unwrap();
    generate_portfolio(template.path(), output.path(), &UserData::new()).unwrap();

    assert!(template.path().join("index.ejs").exists());
    assert!(!template.path().join("index.jsx").exists());
}

#[test]
fn test_missing_entry_files_fail_after_substitution() {
    let template = TempDir::new().unwrap();
    write(template.path(), "index.ejs", "Hello {name}");
    let output = TempDir::new().unwrap();

    let err = generate_portfolio(template.path(), output.path(), &UserData::new()).unwrap_err();
    assert!(matches!(err, Error::IoError(_)));
    // Earlier steps are not rolled back.
    assert!(output.path().join("index.jsx").exists());
}

#[test]
fn test_ensure_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    assert!(ensure_output_dir(path.join("new_dir"), false).is_ok());
    assert!(matches!(
        ensure_output_dir(path, false),
        Err(Error::OutputDirectoryExistsError { .. })
    ));
    assert!(ensure_output_dir(path, true).is_ok());
}
