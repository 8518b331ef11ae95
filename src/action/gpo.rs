//! GPO action - re-target a policy's security filtering to a group.

use super::{powershell, ps_quote};
use anyhow::{Result, bail};
use fanout::{ApplyOutcome, Identity, RemoteAction};

/// Grants a security group Apply permission on a GPO and, unless told
/// otherwise, demotes the default Authenticated Users entry to Read so the
/// policy only applies to the group.
pub struct GpoFilterAction {
    grant_group: String,
    strip_authenticated_users: bool,
}

impl GpoFilterAction {
    pub fn new(grant_group: impl Into<String>, strip_authenticated_users: bool) -> Self {
        Self {
            grant_group: grant_group.into(),
            strip_authenticated_users,
        }
    }

    fn current_permission(&self, gpo: &str) -> Result<String> {
        let script = format!(
            "Import-Module GroupPolicy -ErrorAction Stop; \
             $p = Get-GPPermission -Name '{}' -TargetName '{}' -TargetType Group \
                  -ErrorAction SilentlyContinue; \
             if ($p) {{ $p.Permission.ToString() }}",
            ps_quote(gpo),
            ps_quote(&self.grant_group)
        );
        let output = powershell(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("GPO '{gpo}' could not be read: {}", stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn apply_filtering(&self, gpo: &str) -> Result<()> {
        let mut script = format!(
            "Import-Module GroupPolicy -ErrorAction Stop; \
             Set-GPPermission -Name '{}' -TargetName '{}' -TargetType Group \
                 -PermissionLevel GpoApply -ErrorAction Stop | Out-Null",
            ps_quote(gpo),
            ps_quote(&self.grant_group)
        );
        if self.strip_authenticated_users {
            script.push_str(&format!(
                "; Set-GPPermission -Name '{}' -TargetName 'Authenticated Users' \
                   -TargetType Group -PermissionLevel GpoRead -Replace \
                   -ErrorAction Stop | Out-Null",
                ps_quote(gpo)
            ));
        }

        let output = powershell(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("security filtering on '{gpo}' failed: {}", stderr.trim());
        }
        Ok(())
    }
}

impl RemoteAction for GpoFilterAction {
    fn describe(&self) -> String {
        format!("Filter to group '{}'", self.grant_group)
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let gpo = identity.as_str().trim();

        if self.current_permission(gpo)? == "GpoApply" {
            return Ok(ApplyOutcome::skipped("already filtered"));
        }

        self.apply_filtering(gpo)?;
        Ok(ApplyOutcome::Applied)
    }
}
