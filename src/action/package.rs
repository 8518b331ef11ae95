//! Package action - install or remove software via the platform installer.

use anyhow::{Context, Result, bail};
use fanout::{ApplyOutcome, Identity, RemoteAction};
use std::process::Command;

/// Exit codes the MSI family uses for "done, reboot outstanding".
const ERROR_SUCCESS_REBOOT_INITIATED: i32 = 1641;
const ERROR_SUCCESS_REBOOT_REQUIRED: i32 = 3010;

/// winget: no installed package matched the query.
const APPINSTALLER_NO_PACKAGE: i32 = -1978335212;
/// winget: installed version already satisfies the request.
const APPINSTALLER_UPDATE_NOT_APPLICABLE: i32 = -1978335189;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOp {
    Install,
    Remove,
}

/// Installs or removes one package id per target via the installer tool
/// (winget by default), interpreting its exit codes.
pub struct PackageAction {
    installer: String,
    op: PackageOp,
}

impl PackageAction {
    pub fn new(installer: impl Into<String>, op: PackageOp) -> Self {
        Self {
            installer: installer.into(),
            op,
        }
    }

    fn args<'a>(&self, package: &'a str) -> Vec<&'a str> {
        match self.op {
            PackageOp::Install => vec![
                "install",
                "--id",
                package,
                "--exact",
                "--silent",
                "--accept-package-agreements",
                "--accept-source-agreements",
                "--disable-interactivity",
            ],
            PackageOp::Remove => vec![
                "uninstall",
                "--id",
                package,
                "--exact",
                "--silent",
                "--disable-interactivity",
            ],
        }
    }
}

/// Classify an installer exit code.
fn classify_exit(op: PackageOp, code: i32) -> ExitClass {
    match code {
        0 => ExitClass::Success,
        ERROR_SUCCESS_REBOOT_INITIATED | ERROR_SUCCESS_REBOOT_REQUIRED => ExitClass::RebootPending,
        APPINSTALLER_UPDATE_NOT_APPLICABLE if op == PackageOp::Install => {
            ExitClass::AlreadySatisfied
        }
        APPINSTALLER_NO_PACKAGE if op == PackageOp::Remove => ExitClass::AlreadySatisfied,
        _ => ExitClass::Failure,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ExitClass {
    Success,
    RebootPending,
    AlreadySatisfied,
    Failure,
}

impl RemoteAction for PackageAction {
    fn describe(&self) -> String {
        match self.op {
            PackageOp::Install => format!("Install via {}", self.installer),
            PackageOp::Remove => format!("Remove via {}", self.installer),
        }
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let package = identity.as_str().trim();

        let output = Command::new(&self.installer)
            .args(self.args(package))
            .output()
            .with_context(|| format!("Failed to run {}", self.installer))?;

        // winget reports through stdout; stderr is usually empty.
        let code = output.status.code().unwrap_or(-1);
        match classify_exit(self.op, code) {
            ExitClass::Success => Ok(ApplyOutcome::Applied),
            ExitClass::RebootPending => {
                log::info!("{package}: applied, reboot pending (exit {code})");
                Ok(ApplyOutcome::Applied)
            }
            ExitClass::AlreadySatisfied => Ok(ApplyOutcome::skipped(match self.op {
                PackageOp::Install => "already up to date",
                PackageOp::Remove => "not installed",
            })),
            ExitClass::Failure => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let detail = stdout
                    .lines()
                    .rev()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or("")
                    .trim();
                bail!("{} exited with {code}: {detail}", self.installer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert_eq!(classify_exit(PackageOp::Install, 0), ExitClass::Success);
        assert_eq!(classify_exit(PackageOp::Remove, 0), ExitClass::Success);
    }

    #[test]
    fn reboot_codes_are_success() {
        assert_eq!(
            classify_exit(PackageOp::Install, 3010),
            ExitClass::RebootPending
        );
        assert_eq!(
            classify_exit(PackageOp::Install, 1641),
            ExitClass::RebootPending
        );
    }

    #[test]
    fn already_satisfied_maps_by_operation() {
        assert_eq!(
            classify_exit(PackageOp::Install, APPINSTALLER_UPDATE_NOT_APPLICABLE),
            ExitClass::AlreadySatisfied
        );
        assert_eq!(
            classify_exit(PackageOp::Remove, APPINSTALLER_NO_PACKAGE),
            ExitClass::AlreadySatisfied
        );
        // The same code on the opposite operation is a real failure.
        assert_eq!(
            classify_exit(PackageOp::Remove, APPINSTALLER_UPDATE_NOT_APPLICABLE),
            ExitClass::Failure
        );
    }

    #[test]
    fn other_codes_are_failures() {
        assert_eq!(classify_exit(PackageOp::Install, 1), ExitClass::Failure);
        assert_eq!(classify_exit(PackageOp::Install, -1), ExitClass::Failure);
    }

    #[test]
    fn install_args_are_fixed_and_silent() {
        let action = PackageAction::new("winget", PackageOp::Install);
        let args = action.args("7zip.7zip");
        assert_eq!(args[0], "install");
        assert!(args.contains(&"--silent"));
        assert!(args.contains(&"--exact"));
        assert!(args.contains(&"7zip.7zip"));
    }
}
