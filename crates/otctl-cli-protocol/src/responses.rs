//! Response classification for the OpenThread CLI.
//!
//! Firmware output is not a stable, versioned format: the echoed command, shell
//! prompts and line noise are interleaved with the actual reply. Classification
//! is therefore keyword based:
//!
//! - Command acknowledgement: `Done` present anywhere means success
//! - Role queries: boilerplate is stripped, then role keywords are tested in a
//!   fixed precedence order
//! - Platform probes: a per-dialect marker substring identifies the board family

use crate::commands::CliDialect;

/// Marker the firmware prints after a successfully executed command.
pub const DONE_MARKER: &str = "Done";

/// Zephyr shell prompt.
pub const ZEPHYR_PROMPT: &str = "uart:~$";

/// Native OpenThread CLI prompt.
pub const CLI_PROMPT: &str = ">";

/// Substring in `ot platform` output identifying a Zephyr based board.
pub const ZEPHYR_PLATFORM_MARKER: &str = "Zephyr";

/// Substring in `platform` output identifying a Silicon Labs EFR32 board.
pub const EFR32_PLATFORM_MARKER: &str = "EFR32";

/// Substrings the firmware uses when it does not know a command.
const UNRECOGNIZED_MARKERS: &[&str] = &["InvalidCommand", "command not found"];

/// Normalized acknowledgement status of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The firmware replied with `Done`.
    Done,
    /// No `Done` marker in the reply.
    Failed,
    /// The firmware did not know the command.
    Unrecognized,
}

impl CommandStatus {
    /// Check if this status is a success.
    pub fn is_done(&self) -> bool {
        matches!(self, CommandStatus::Done)
    }

    /// Lowercase name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Done => "done",
            CommandStatus::Failed => "failed",
            CommandStatus::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread device role as reported by `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadRole {
    /// Thread stack is not running.
    Disabled,
    /// Stack running but not attached to a partition.
    Detached,
    /// Attached as a child of a router.
    Child,
    /// Attached as a router.
    Router,
    /// Partition leader.
    Leader,
    /// Reply did not contain a recognizable role.
    #[default]
    Unknown,
}

impl ThreadRole {
    /// Lowercase role name as printed by the firmware.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadRole::Disabled => "disabled",
            ThreadRole::Detached => "detached",
            ThreadRole::Child => "child",
            ThreadRole::Router => "router",
            ThreadRole::Leader => "leader",
            ThreadRole::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board family, identified from the platform probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFamily {
    /// nRF board running Zephyr with the OpenThread shell module.
    ZephyrNRF,
    /// Silicon Labs EFR32 board running the native OpenThread CLI.
    EFR32,
    /// Not identified.
    #[default]
    Unknown,
}

impl PlatformFamily {
    /// The CLI dialect commands must be rendered in for this family.
    pub fn dialect(&self) -> CliDialect {
        match self {
            PlatformFamily::EFR32 => CliDialect::Native,
            PlatformFamily::ZephyrNRF | PlatformFamily::Unknown => CliDialect::Zephyr,
        }
    }

    /// Short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::ZephyrNRF => "zephyr-nrf",
            PlatformFamily::EFR32 => "efr32",
            PlatformFamily::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One platform identification probe: the dialect to send `platform` in, the
/// marker to look for, and the family it identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProbe {
    /// Dialect the `platform` command is rendered in.
    pub dialect: CliDialect,
    /// Substring identifying the family.
    pub marker: &'static str,
    /// Family reported on a match.
    pub family: PlatformFamily,
}

impl PlatformProbe {
    /// Check a probe reply for this probe's marker.
    pub fn matches(&self, response: &str) -> bool {
        response.contains(self.marker)
    }
}

/// Identification probes, tried in order; the first match classifies the port.
pub const PLATFORM_PROBES: &[PlatformProbe] = &[
    PlatformProbe {
        dialect: CliDialect::Zephyr,
        marker: ZEPHYR_PLATFORM_MARKER,
        family: PlatformFamily::ZephyrNRF,
    },
    PlatformProbe {
        dialect: CliDialect::Native,
        marker: EFR32_PLATFORM_MARKER,
        family: PlatformFamily::EFR32,
    },
];

/// A boilerplate substring removed from a reply before keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripRule {
    /// Text to search for.
    pub marker: &'static str,
    /// Replacement text.
    pub replacement: &'static str,
}

impl StripRule {
    const fn remove(marker: &'static str) -> Self {
        StripRule { marker, replacement: "" }
    }

    /// Apply the rule to every occurrence of the marker.
    pub fn apply(&self, text: &str) -> String {
        text.replace(self.marker, self.replacement)
    }
}

/// Rules applied to `state` replies, in order.
pub const STATE_STRIP_RULES: &[StripRule] = &[
    StripRule::remove(ZEPHYR_PROMPT),
    StripRule::remove("ot state"),
    StripRule::remove("state"),
    StripRule::remove(DONE_MARKER),
    StripRule::remove(CLI_PROMPT),
];

/// Role keywords in precedence order; the first keyword found wins.
pub const ROLE_PRECEDENCE: &[(&str, ThreadRole)] = &[
    ("child", ThreadRole::Child),
    ("disabled", ThreadRole::Disabled),
    ("detached", ThreadRole::Detached),
    ("router", ThreadRole::Router),
    ("leader", ThreadRole::Leader),
];

/// Apply a list of strip rules in order.
pub fn strip_boilerplate(text: &str, rules: &[StripRule]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Classify a command acknowledgement.
///
/// Returns [`CommandStatus::Done`] if the completion marker appears anywhere in
/// the reply (case-sensitive), otherwise [`CommandStatus::Failed`]. Echo and
/// prompt text around the marker does not matter.
pub fn classify_command_result(raw: &str) -> CommandStatus {
    if raw.contains(DONE_MARKER) {
        CommandStatus::Done
    } else {
        CommandStatus::Failed
    }
}

/// Classify a command reply for reporting, separating unknown commands from
/// other failures.
pub fn classify_outcome(raw: &str) -> CommandStatus {
    match classify_command_result(raw) {
        CommandStatus::Done => CommandStatus::Done,
        _ if UNRECOGNIZED_MARKERS.iter().any(|m| raw.contains(m)) => CommandStatus::Unrecognized,
        status => status,
    }
}

/// Classify a `state` reply into a Thread role.
pub fn classify_state(raw: &str) -> ThreadRole {
    let stripped = strip_boilerplate(raw, STATE_STRIP_RULES);
    let text = stripped.trim();

    let role = ROLE_PRECEDENCE
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|&(_, role)| role)
        .unwrap_or(ThreadRole::Unknown);

    log::trace!("classified state reply {:?} as {}", text, role);
    role
}

/// Normalize a reply for side-by-side comparison across devices.
///
/// Removes the echoed command and both shell prompts and folds the reply onto a
/// single line.
pub fn normalize_response(raw: &str, command: &str) -> String {
    let text = if command.is_empty() {
        raw.to_string()
    } else {
        raw.replace(command, "")
    };
    text.replace(ZEPHYR_PROMPT, "")
        .replace(CLI_PROMPT, "")
        .replace('\r', "")
        .replace('\n', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_anywhere_is_success() {
        assert_eq!(classify_command_result("Done"), CommandStatus::Done);
        assert_eq!(classify_command_result("> \r\nDone\r\n> "), CommandStatus::Done);
        assert_eq!(
            classify_command_result("uart:~$ ot ifconfig up\r\nDone\r\nuart:~$ "),
            CommandStatus::Done
        );
    }

    #[test]
    fn test_missing_done_is_failure() {
        assert_eq!(classify_command_result(""), CommandStatus::Failed);
        assert_eq!(classify_command_result("Error 13: InvalidState\r\n> "), CommandStatus::Failed);
        assert_eq!(classify_command_result("done"), CommandStatus::Failed);
    }

    #[test]
    fn test_outcome_unrecognized() {
        assert_eq!(classify_outcome("Error 35: InvalidCommand"), CommandStatus::Unrecognized);
        assert_eq!(classify_outcome("foo: command not found"), CommandStatus::Unrecognized);
        assert_eq!(classify_outcome("Error 7: InvalidArgs"), CommandStatus::Failed);
        assert_eq!(classify_outcome("Done"), CommandStatus::Done);
    }

    #[test]
    fn test_classify_each_role() {
        assert_eq!(classify_state("leader\r\nDone\r\n>"), ThreadRole::Leader);
        assert_eq!(classify_state("router\r\nDone"), ThreadRole::Router);
        assert_eq!(classify_state("child\r\nDone"), ThreadRole::Child);
        assert_eq!(classify_state("detached\r\nDone"), ThreadRole::Detached);
        assert_eq!(classify_state("disabled\r\nDone"), ThreadRole::Disabled);
    }

    #[test]
    fn test_precedence_not_position() {
        assert_eq!(classify_state("...router leader Done"), ThreadRole::Router);
        assert_eq!(classify_state("leader child"), ThreadRole::Child);
        assert_eq!(classify_state("detached disabled"), ThreadRole::Disabled);
    }

    #[test]
    fn test_classify_strips_zephyr_boilerplate() {
        let raw = "uart:~$ ot state\r\nleader\r\nDone\r\nuart:~$ ";
        assert_eq!(classify_state(raw), ThreadRole::Leader);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_state(""), ThreadRole::Unknown);
        assert_eq!(classify_state("ot state\r\nDone\r\n>"), ThreadRole::Unknown);
        assert_eq!(classify_state("Error 35: InvalidCommand"), ThreadRole::Unknown);
    }

    #[test]
    fn test_strip_rules_individually() {
        assert_eq!(StripRule::remove(ZEPHYR_PROMPT).apply("uart:~$ leader"), " leader");
        assert_eq!(StripRule::remove(DONE_MARKER).apply("leader Done"), "leader ");
        assert_eq!(StripRule::remove(CLI_PROMPT).apply("> leader"), " leader");
        assert_eq!(StripRule::remove("ot state").apply("ot state leader"), " leader");
    }

    #[test]
    fn test_platform_probes() {
        let zephyr = &PLATFORM_PROBES[0];
        assert!(zephyr.matches("ot platform\r\nZephyr\r\nDone\r\n>"));
        assert!(!zephyr.matches("EFR32\r\nDone"));
        assert_eq!(zephyr.dialect, CliDialect::Zephyr);

        let efr32 = &PLATFORM_PROBES[1];
        assert!(efr32.matches("EFR32MG24\r\nDone\r\n> "));
        assert_eq!(efr32.family.dialect(), CliDialect::Native);
    }

    #[test]
    fn test_normalize_response() {
        let raw = "ot state\r\nleader\r\nDone\r\n> ";
        assert_eq!(normalize_response(raw, "ot state"), "leader Done");
        assert_eq!(normalize_response("> \r\n", ""), "");
        assert_eq!(
            normalize_response("Zephyr\r\nDone\r\nuart:~$ ", "ot platform"),
            "Zephyr Done"
        );
    }
}
