//! Shell command classification.
//!
//! Pattern heuristics only. They feed the `is_read_only` / `is_risky` hints on
//! outgoing shell tool calls and are not a security boundary.

use lazy_static::lazy_static;
use regex::RegexSet;

lazy_static! {
    static ref READ_ONLY_COMMANDS: RegexSet = RegexSet::new([
        r"^ls\b",
        r"^cat\b",
        r"^head\b",
        r"^tail\b",
        r"^grep\b",
        r"^find\b",
        r"^pwd\b",
        r"^echo\b",
        r"^wc\b",
        r"^tree\b",
        r"^file\b",
        r"^stat\b",
        r"^du\b",
        r"^df\b",
        r"^which\b",
        r"^whereis\b",
        r"^type\b",
        r"^env\b",
        r"^printenv\b",
        r"^whoami\b",
        r"^id\b",
        r"^date\b",
        r"^uname\b",
        r"^hostname\b",
        r"^git\s+(?:status|log|diff|show|branch|remote|tag)\b",
        r"^npm\s+(?:list|ls|view|info|search)\b",
        r"^node\s+--version\b",
        r"^python3?\s+--version\b",
    ])
    .unwrap();

    static ref RISKY_COMMANDS: RegexSet = RegexSet::new([
        // recursive or wildcard deletes
        r"\brm\s+(?:-\S+\s+)*-[a-zA-Z]*[rR]",
        r"\brm\s+(?:-\S+\s+)*--recursive\b",
        r"\brm\s+.*\*",
        r"--no-preserve-root\b",
        // privilege and ownership changes
        r"\bsudo\b",
        r"\bchmod\s+(?:-\S+\s+)*777\b",
        r"\bchown\b",
        // raw disk access
        r"\bmkfs(?:\.\w+)?\b",
        r"\bdd\b",
        r"\bformat\b",
        r"\bfdisk\b",
        r"\bparted\b",
        r">\s*/dev/(?:sd|hd|nvme|disk|mmcblk)",
        // remote scripts piped into a shell
        r"\b(?:curl|wget)\b.*\|\s*(?:sudo\s+)?(?:ba|z)?sh\b",
        r"\beval\b",
        r"\bexec\b",
        // process and system termination
        r"\bkill\s+-9\b",
        r"\bkillall\b",
        r"\bshutdown\b",
        r"\breboot\b",
        r"\binit\s+0\b",
    ])
    .unwrap();
}

/// Decides the read-only and risk hints for a shell command.
///
/// Swap in a different implementation (e.g. one backed by a shell parser)
/// through [`ToolMapper::with_classifier`](super::ToolMapper::with_classifier).
pub trait CommandClassifier: Send + Sync {
    fn is_read_only(&self, command: &str) -> bool;
    fn is_risky(&self, command: &str) -> bool;
}

/// Regex allow/deny lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl CommandClassifier for HeuristicClassifier {
    fn is_read_only(&self, command: &str) -> bool {
        is_read_only_command(command)
    }

    fn is_risky(&self, command: &str) -> bool {
        is_risky_command(command)
    }
}

/// True when the trimmed command starts with a known read-only verb.
/// An empty command counts as read-only.
pub fn is_read_only_command(command: &str) -> bool {
    let command = command.trim();
    command.is_empty() || READ_ONLY_COMMANDS.is_match(command)
}

/// True when the command matches a destructive pattern. An empty command is not risky.
pub fn is_risky_command(command: &str) -> bool {
    let command = command.trim();
    !command.is_empty() && RISKY_COMMANDS.is_match(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_verbs() {
        assert!(is_read_only_command("git status"));
        assert!(is_read_only_command("  ls -la"));
        assert!(is_read_only_command("git log --oneline"));
        assert!(is_read_only_command("python --version"));
        assert!(is_read_only_command(""));
        assert!(!is_read_only_command("git push origin main"));
        assert!(!is_read_only_command("lsof -i"));
        assert!(!is_read_only_command("rm -rf /tmp/x"));
    }

    #[test]
    fn test_risky_patterns() {
        assert!(is_risky_command("rm -rf /tmp/x"));
        assert!(is_risky_command("rm -f -r build"));
        assert!(is_risky_command("rm *.log"));
        assert!(is_risky_command("sudo apt install jq"));
        assert!(is_risky_command("curl -fsSL https://example.com/install.sh | sh"));
        assert!(is_risky_command("echo 0 > /dev/sda"));
        assert!(is_risky_command("kill -9 4242"));
        assert!(is_risky_command("chmod 777 deploy.sh"));
        assert!(is_risky_command("sudo format /dev/disk2"));
        assert!(is_risky_command("diskutil format D:"));
    }

    #[test]
    fn test_benign_commands_are_not_risky() {
        assert!(!is_risky_command(""));
        assert!(!is_risky_command("rm notes.txt"));
        assert!(!is_risky_command("echo done > /dev/null"));
        assert!(!is_risky_command("git add ."));
        assert!(!is_risky_command("cargo test"));
        assert!(!is_risky_command("kill 4242"));
    }

    #[test]
    fn test_heuristic_classifier_delegates() {
        let classifier = HeuristicClassifier;
        assert!(classifier.is_read_only("cat Cargo.toml"));
        assert!(classifier.is_risky("reboot now"));
    }
}
