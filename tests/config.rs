//! Configuration loading and build context validation.

use std::fs;

use kodegen_bundler_installer::bundler::{
    Artifact, ArtifactSource, BuildContextBuilder, CommandSpec, Error, ServiceSettings, StageName,
};
use kodegen_bundler_installer::config::load_config;
use kodegen_bundler_installer::error::{CliError, InstallerError};
use tempfile::TempDir;

const TOML_CONFIG: &str = r#"
artifacts_dir = "work/artifacts"
build_dir = "work/build"

[layout]
base_artifact = "gpii-wix-installer"
app_artifact = "gpii-app"

[tools.packager]
name = "morphic-app"
app_version = "1.2.0"

[[artifacts]]
id = "gpii-app"
repo = "https://github.com/GPII/gpii-app/"
hash = "92f9b5e1"

[[artifacts]]
id = "gpii-wix-installer"
repo = "https://github.com/GPII/gpii-wix-installer"
hash = "0e1d2c3b"
build = { command = "npm", arguments = ["run", "build"] }

[[artifacts]]
id = "reset-to-standard"
url = "https://example.org/data/resetToStandard.json5"
outputPath = "gpii-app/testData/resetToStandard.json5"
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_toml_config() {
    let tmp = TempDir::new().unwrap();
    let path = write(&tmp, "installer.toml", TOML_CONFIG);

    let ctx = load_config(&path).unwrap();

    assert_eq!(ctx.artifacts_dir(), tmp.path().join("work/artifacts"));
    assert_eq!(ctx.build_dir(), tmp.path().join("work/build"));
    assert_eq!(ctx.app_dir(), tmp.path().join("work/build/gpii-app"));
    assert_eq!(ctx.tools().packager.output_dir_name(), "morphic-app-win32-ia32");
    assert_eq!(ctx.tools().packager.app_version.as_deref(), Some("1.2.0"));
    assert!(!ctx.stages().contains(&StageName::BuildService));
    assert_eq!(ctx.stages().len(), StageName::ALL.len() - 1);

    let artifacts = ctx.artifacts();
    assert_eq!(artifacts.len(), 3);
    assert_eq!(
        artifacts[0].source().download_url(),
        "https://github.com/GPII/gpii-app/archive/92f9b5e1.zip"
    );
    assert_eq!(artifacts[1].build().unwrap().arguments, vec!["run", "build"]);

    let reset = &artifacts[2];
    assert_eq!(reset.source().file_name(), "resetToStandard.json5");
    assert!(!reset.source().needs_extraction());
    assert_eq!(reset.output(), Some("resetToStandard.json5"));
    assert_eq!(
        reset.output_path().unwrap(),
        std::path::Path::new("gpii-app/testData/resetToStandard.json5")
    );
}

#[test]
fn test_load_json_config_keyed_by_id() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        &tmp,
        "installer.json",
        r#"{
            "build_dir": "/tmp/installer-build",
            "cancel_on_failure": true,
            "stages": ["install_dependencies", "shrink_package"],
            "artifacts": {
                "gpii-app": { "repo": "https://github.com/GPII/gpii-app", "hash": "92f9b5e1" }
            }
        }"#,
    );

    let ctx = load_config(&path).unwrap();

    assert_eq!(ctx.artifacts()[0].id(), "gpii-app");
    assert_eq!(ctx.artifacts_dir(), tmp.path().join("artifacts"));
    assert_eq!(ctx.build_dir(), std::path::Path::new("/tmp/installer-build"));
    assert!(ctx.cancel_on_failure());
    assert_eq!(
        ctx.stages(),
        &[StageName::InstallDependencies, StageName::ShrinkPackage]
    );
}

#[test]
fn test_load_json5_config() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        &tmp,
        "artifacts.json5",
        r#"// artifacts
{
    build_dir: 'build',
    layout: { base_artifact: 'gpii-wix-installer', app_artifact: 'gpii-app' },
    artifacts: {
        'gpii-app': {
            repo: 'https://github.com/GPII/gpii-app',
            hash: '92f9b5e1', // pinned
        },
        'gpii-wix-installer': {
            repo: 'https://github.com/GPII/gpii-wix-installer',
            hash: '0e1d2c3b',
        },
    },
}
"#,
    );

    let ctx = load_config(&path).unwrap();

    let ids: Vec<_> = ctx.artifacts().iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec!["gpii-app", "gpii-wix-installer"]);
    assert_eq!(ctx.build_dir(), tmp.path().join("build"));
}

#[test]
fn test_undeclared_layout_artifact_fails_loading() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        &tmp,
        "installer.toml",
        "[layout]\nbase_artifact = \"nope\"\napp_artifact = \"nada\"\n\n\
         [[artifacts]]\nid = \"x\"\nrepo = \"https://a/x\"\nhash = \"1\"\n",
    );

    let err = load_config(&path).unwrap_err();

    assert!(matches!(err, InstallerError::Bundler(Error::Config(_))));
    assert!(err.to_string().contains("`nope`"), "{err}");
}

#[test]
fn test_repo_requires_hash() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        &tmp,
        "installer.toml",
        "[[artifacts]]\nid = \"app\"\nrepo = \"https://github.com/org/app\"\n",
    );

    let err = load_config(&path).unwrap_err();

    assert!(matches!(err, InstallerError::Cli(CliError::InvalidConfig { .. })));
    assert!(err.to_string().contains("requires `hash`"), "{err}");
}

#[test]
fn test_repo_and_url_are_exclusive() {
    let tmp = TempDir::new().unwrap();
    let path = write(
        &tmp,
        "installer.toml",
        "[[artifacts]]\nid = \"app\"\nrepo = \"https://a\"\nhash = \"1\"\nurl = \"https://b/c.zip\"\n",
    );

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("mutually exclusive"), "{err}");
}

#[test]
fn test_unknown_stage_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write(&tmp, "installer.toml", "stages = [\"sign_installer\"]\n");

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, InstallerError::Toml(_)));
}

#[test]
fn test_missing_config_file() {
    let tmp = TempDir::new().unwrap();

    let err = load_config(&tmp.path().join("absent.toml")).unwrap_err();
    assert!(err.is_configuration_error());
}

fn repo(id: &str) -> Artifact {
    Artifact::new(
        id,
        ArtifactSource::Repository {
            root: format!("https://github.com/org/{id}"),
            hash: "abc".to_string(),
        },
    )
}

#[test]
fn test_builder_requires_directories() {
    let err = BuildContextBuilder::new().build_dir("build").build().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_builder_rejects_duplicate_ids() {
    let err = BuildContextBuilder::new()
        .artifacts_dir("a")
        .build_dir("b")
        .artifact(repo("app"))
        .artifact(repo("app"))
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("more than once"), "{err}");
}

#[test]
fn test_builder_rejects_shared_download_file() {
    let shared = |id: &str| {
        Artifact::new(
            id,
            ArtifactSource::Repository {
                root: format!("https://github.com/org/{id}"),
                hash: "same".to_string(),
            },
        )
    };

    let err = BuildContextBuilder::new()
        .artifacts_dir("a")
        .build_dir("b")
        .stages(Vec::new())
        .artifact(shared("first"))
        .artifact(shared("second"))
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("both download to `same.zip`"), "{err}");
}

#[test]
fn test_builder_rejects_out_of_order_stages() {
    let err = BuildContextBuilder::new()
        .artifacts_dir("a")
        .build_dir("b")
        .stages(vec![StageName::PackageExecutable, StageName::InstallDependencies])
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("cannot follow"), "{err}");

    let err = BuildContextBuilder::new()
        .artifacts_dir("a")
        .build_dir("b")
        .stages(vec![StageName::ShrinkPackage, StageName::ShrinkPackage])
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_service_stage_follows_service_settings() {
    let err = BuildContextBuilder::new()
        .artifacts_dir("a")
        .build_dir("b")
        .stages(vec![StageName::BuildService])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let ctx = BuildContextBuilder::new()
        .artifacts_dir("a")
        .build_dir("b")
        .artifact(repo("installer"))
        .artifact(Artifact::new(
            "app",
            ArtifactSource::Repository {
                root: "https://github.com/org/app".to_string(),
                hash: "def".to_string(),
            },
        ))
        .service(ServiceSettings {
            folder: "gpii-service".to_string(),
            install: CommandSpec::new("npm", &["install"]),
            compile: CommandSpec::new("pkg", &["."]),
            before_compile: Vec::new(),
            after_compile: Vec::new(),
        })
        .build()
        .unwrap();
    assert_eq!(ctx.stages(), &StageName::ALL);
    assert_eq!(
        ctx.expand("{service_dir}/x"),
        format!("{}/x", ctx.build_dir().join("gpii-service").display())
    );
}

#[test]
fn test_stage_names_round_trip_through_strings() {
    for stage in StageName::ALL {
        assert_eq!(stage.as_str().parse::<StageName>().unwrap(), stage);
    }
    assert!("sign".parse::<StageName>().is_err());
}
