//! Settings for the external tools driven by the build stages.
//!
//! Every struct here deserializes straight from the `[tools]`, `[layout]` and
//! `[service]` sections of the installer configuration, with defaults matching
//! an Electron application packaged into a Windows installer.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A program plus its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    /// Program name
    pub command: String,

    /// Arguments
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl CommandSpec {
    /// Creates a command spec from a program and arguments.
    pub fn new(command: &str, arguments: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Which artifacts seed the build directory.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Artifact copied to the build root (the installer project)
    pub base_artifact: String,

    /// Artifact copied to `<build>/<app_artifact>` (the application)
    pub app_artifact: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            base_artifact: "installer".to_string(),
            app_artifact: "app".to_string(),
        }
    }
}

/// Executable packager descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackagerSettings {
    /// Packager program
    pub command: String,

    /// Executable name; the packager writes `<name>-<platform>-<arch>`
    pub name: String,

    /// Target platform
    pub platform: String,

    /// Target architecture
    pub arch: String,

    /// Application version stamped into the executable
    pub app_version: Option<String>,

    /// Copyright string
    pub copyright: Option<String>,

    /// Win32 version-string metadata (CompanyName, ProductName, ...)
    pub metadata: BTreeMap<String, String>,

    /// Directory under the build root receiving the packager output
    pub staging_dir: String,

    /// Name the packager output directory is renamed to
    pub staging_name: String,
}

impl Default for PackagerSettings {
    fn default() -> Self {
        Self {
            command: "electron-packager".to_string(),
            name: "app".to_string(),
            platform: "win32".to_string(),
            arch: "ia32".to_string(),
            app_version: None,
            copyright: None,
            metadata: BTreeMap::new(),
            staging_dir: "staging".to_string(),
            staging_name: "windows".to_string(),
        }
    }
}

impl PackagerSettings {
    /// Name of the directory the packager produces.
    pub fn output_dir_name(&self) -> String {
        format!("{}-{}-{}", self.name, self.platform, self.arch)
    }
}

/// Final installer compilation through a scripting shell.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Shell program; `None` picks `pwsh` or `powershell` from `PATH`
    pub shell: Option<String>,

    /// Arguments placed before the script
    pub shell_args: Vec<String>,

    /// Script steps, joined with `; `. `{build_dir}` is substituted.
    pub script: Vec<String>,

    /// Output folder created under the build root before compiling
    pub output_dir: String,

    /// Temp folder created under the build root before compiling
    pub temp_dir: String,

    /// Directory the script runs in; defaults to the current directory
    pub working_dir: Option<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            shell: None,
            shell_args: vec![
                "-NoProfile".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-Command".to_string(),
            ],
            script: vec![
                r"Import-Module .\provisioning\Provisioning.psm1 -Force".to_string(),
                r"Invoke-Environment 'C:\Program Files (x86)\Microsoft Visual C++ Build Tools\vcbuildtools_msbuild.bat'".to_string(),
                "$setupDir = Join-Path '{build_dir}' 'setup'".to_string(),
                "$msbuild = Get-MSBuild '4.0'".to_string(),
                "Invoke-Command $msbuild 'setup.msbuild' $setupDir".to_string(),
            ],
            output_dir: "output".to_string(),
            temp_dir: "temp".to_string(),
            working_dir: None,
        }
    }
}

/// Commands used by the dependency, packaging and size-reduction stages.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Dependency installer, run in `<build>/<app>`
    pub install: CommandSpec,

    /// Size-reduction steps (production prune, dedupe, ...), run in order in
    /// the packaged app directory
    pub shrink_steps: Vec<CommandSpec>,

    /// Packaged app directory, relative to the staging output
    pub packaged_app_dir: String,

    /// Module directories deleted from the packaged `node_modules`
    pub prune_modules: Vec<String>,

    /// Executable packager
    pub packager: PackagerSettings,

    /// Installer compiler
    pub compiler: CompilerSettings,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            install: CommandSpec::new("npm", &["install"]),
            shrink_steps: vec![CommandSpec::new("npm", &["prune", "--production"])],
            packaged_app_dir: "resources/app".to_string(),
            prune_modules: vec!["electron".to_string()],
            packager: PackagerSettings::default(),
            compiler: CompilerSettings::default(),
        }
    }
}

/// A file copy performed by the service stage.
///
/// Both ends accept `{build_dir}`, `{staging_dir}` and `{service_dir}`;
/// relative paths resolve against the build directory.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FileCopy {
    /// Source file
    pub from: String,
    /// Destination file
    pub to: String,
}

/// Background service compiled next to the packaged application.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServiceSettings {
    /// Service sources, relative to the build directory
    pub folder: String,

    /// Dependency installer run in the service folder
    #[serde(default = "default_service_install")]
    pub install: CommandSpec,

    /// Compiler producing the service executable
    pub compile: CommandSpec,

    /// Copies performed before compiling
    #[serde(default)]
    pub before_compile: Vec<FileCopy>,

    /// Copies performed after compiling (native modules, config)
    #[serde(default)]
    pub after_compile: Vec<FileCopy>,
}

fn default_service_install() -> CommandSpec {
    CommandSpec::new("npm", &["install", "--production"])
}
