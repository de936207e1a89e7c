//! # fail2ban Jail
//!
//! The `[sshd]` jail written to `jail.local` on setup. The file is replaced
//! wholesale each time; no backup of the previous contents is kept.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::CheckerResult;

/// Jail parameters. Durations use fail2ban's own suffix syntax (`1d`, `4w`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JailConfig {
    /// Section name, and the jail fail2ban reports.
    pub name: String,
    pub enabled: bool,
    pub port: String,
    pub filter: String,
    pub logpath: PathBuf,
    pub maxretry: u32,
    pub findtime: String,
    pub bantime: String,
    /// Addresses that are never banned, space separated in the output.
    pub ignoreip: Vec<String>,
}

impl Default for JailConfig {
    fn default() -> Self {
        Self {
            name: "sshd".to_string(),
            enabled: true,
            port: "ssh".to_string(),
            filter: "sshd".to_string(),
            logpath: PathBuf::from("/var/log/auth.log"),
            maxretry: 3,
            findtime: "1d".to_string(),
            bantime: "4w".to_string(),
            ignoreip: vec!["127.0.0.1".to_string()],
        }
    }
}

impl JailConfig {
    /// INI text as fail2ban reads it.
    pub fn render(&self) -> String {
        format!(
            "[{}]\n\
             enabled = {}\n\
             port = {}\n\
             filter = {}\n\
             logpath = {}\n\
             maxretry = {}\n\
             findtime = {}\n\
             bantime = {}\n\
             ignoreip = {}\n",
            self.name,
            self.enabled,
            self.port,
            self.filter,
            self.logpath.display(),
            self.maxretry,
            self.findtime,
            self.bantime,
            self.ignoreip.join(" "),
        )
    }

    /// Overwrite `path` with the rendered jail, creating the parent
    /// directory if needed.
    pub fn write_to(&self, path: &Path) -> CheckerResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render())?;
        log::info!("[CONFIGURE] Wrote jail [{}] to {}", self.name, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render() {
        let expected = "\
[sshd]
enabled = true
port = ssh
filter = sshd
logpath = /var/log/auth.log
maxretry = 3
findtime = 1d
bantime = 4w
ignoreip = 127.0.0.1
";
        assert_eq!(JailConfig::default().render(), expected);
    }

    #[test]
    fn test_multiple_ignoreip_space_separated() {
        let jail = JailConfig {
            ignoreip: vec!["127.0.0.1/8".into(), "::1".into(), "10.0.0.0/8".into()],
            ..JailConfig::default()
        };
        assert!(jail.render().contains("ignoreip = 127.0.0.1/8 ::1 10.0.0.0/8\n"));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = std::env::temp_dir().join("auth-checker-jail-test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("fail2ban").join("jail.local");

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[old]\nenabled = false\n").unwrap();

        JailConfig::default().write_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, JailConfig::default().render());
        assert!(!written.contains("[old]"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
