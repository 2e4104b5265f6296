use folio::constants::{APP_FILE, BOOTSTRAP_FILE, SECTIONS};
use folio::error::Error;
use folio::injector::inject_user_data;
use folio::user_data::UserData;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const APP: &str = r#"import Hero from "./components/Hero";

const App = () => {
  return (
    <main>
      <Navbar />
      <Hero />
      <About />
      <Projects />
      <Clients />
      <WorkExperience />
      <Contact />
      <Footer />
    </main>
  );
};

export default App;
"#;

const BOOTSTRAP: &str = r#"import { StrictMode } from "react";
import { createRoot } from "react-dom/client";
import App from "./App.jsx";

createRoot(document.getElementById("root")).render(
  <StrictMode>
    <App />
  </StrictMode>
);
"#;

fn project(app: &str, bootstrap: &str) -> TempDir {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("src")).unwrap();
    fs::write(root.path().join(APP_FILE), app).unwrap();
    fs::write(root.path().join(BOOTSTRAP_FILE), bootstrap).unwrap();
    root
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

fn sample_data() -> UserData {
    UserData::new()
        .with("name", "Ada \"Countess\" Lovelace")
        .with("skills", serde_json::json!(["Rust", "Math"]))
        .with("projects", serde_json::json!([{ "title": "Engine", "technologiesUsed": [] }]))
}

#[test]
fn test_app_file_forwards_user_data_to_every_section() {
    let root = project(APP, BOOTSTRAP);
    let report = inject_user_data(root.path(), &sample_data()).unwrap();

    assert!(report.missing.is_empty());
    assert_eq!(report.applied, 1 + SECTIONS.len() + 1);

    let app = read(root.path(), APP_FILE);
    assert_eq!(app.matches("const App = ({ userData }) => {").count(), 1);
    for section in SECTIONS {
        assert!(app.contains(&format!("<{section} userData={{userData}} />")), "{section}");
        assert!(!app.contains(&format!("<{section} />")), "{section}");
    }
}

#[test]
fn test_bootstrap_embeds_valid_json_literal() {
    let root = project(APP, BOOTSTRAP);
    let data = sample_data();
    inject_user_data(root.path(), &data).unwrap();

    let bootstrap = read(root.path(), BOOTSTRAP_FILE);
    assert_eq!(bootstrap.matches("<App ").count(), 1);
    assert!(!bootstrap.contains("<App />"));

    let start = bootstrap.find("<App userData={").unwrap() + "<App userData={".len();
    let end = bootstrap.rfind("} />").unwrap();
    let embedded: serde_json::Value = serde_json::from_str(&bootstrap[start..end]).unwrap();
    assert_eq!(embedded, data.to_value());
}

#[test]
fn test_missing_anchors_are_reported() {
    let app = APP.replace("      <Clients />\n", "");
    let root = project(&app, BOOTSTRAP);
    let report = inject_user_data(root.path(), &UserData::new()).unwrap();

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].anchor, "<Clients />");
    assert!(report.missing[0].file.ends_with(APP_FILE));
}

#[test]
fn test_second_injection_is_rejected() {
    let root = project(APP, BOOTSTRAP);
    inject_user_data(root.path(), &UserData::new()).unwrap();
    let once = read(root.path(), APP_FILE);

    let err = inject_user_data(root.path(), &UserData::new()).unwrap_err();
    assert!(matches!(err, Error::InjectionError(_)));
    assert_eq!(read(root.path(), APP_FILE), once);
}

#[test]
fn test_missing_entry_file_is_io_error() {
    let root = TempDir::new().unwrap();
    let err = inject_user_data(root.path(), &UserData::new()).unwrap_err();
    assert!(matches!(err, Error::IoError(_)));
}
