//! Console verbs and their dispatch onto the fleet.

use std::io::{BufRead, Write};
use std::str::FromStr;

use otctl_cli_protocol::parse_tx_power;
use otctl_fleet::{Fleet, FleetError};
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};
use crate::report;

/// Prompt printed before each interactive line.
pub const PROMPT: &str = "> ";

/// One console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Discover, then provision one router and N children.
    Config,
    /// Discover and report the device count.
    Find,
    /// Locate the TTM reference unit.
    FindTtm,
    /// List known devices.
    List,
    /// Stop the stack on every device.
    Reset,
    /// Hard reboot every device.
    Reboot,
    /// Stop, pause, start every device.
    Restart,
    /// Start every device.
    Start,
    /// Stop every device.
    Stop,
    /// Rediscover, then report every device's role.
    State,
    /// Set the TTM transmit power.
    TtmPower(i8),
    /// Send a raw line to every device.
    Send(String),
    /// List OS serial ports.
    Ports,
    /// Show the verb list.
    Help,
    /// Leave the console.
    Quit,
    /// Blank input line.
    Empty,
}

impl FromStr for Verb {
    type Err = RunnerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let verb = match (word, rest) {
            ("", _) => Verb::Empty,
            ("config", "") => Verb::Config,
            ("find", "") => Verb::Find,
            ("find", "ttm") => Verb::FindTtm,
            ("list", "") => Verb::List,
            ("reset", "") => Verb::Reset,
            ("reboot", "") => Verb::Reboot,
            ("restart", "") => Verb::Restart,
            ("start", "") => Verb::Start,
            ("stop", "") => Verb::Stop,
            ("state", "") => Verb::State,
            ("ports", "") => Verb::Ports,
            ("help" | "h", "") => Verb::Help,
            ("quit" | "q", "") => Verb::Quit,
            ("ttmpower", "") => {
                return Err(RunnerError::MissingArgument {
                    verb: "ttmpower",
                    usage: "ttmpower <dBm>",
                })
            }
            ("ttmpower", dbm) => Verb::TtmPower(parse_tx_power(dbm)?),
            ("send", "") => {
                return Err(RunnerError::MissingArgument {
                    verb: "send",
                    usage: "send <command>",
                })
            }
            ("send", command) => Verb::Send(command.to_string()),
            _ => return Err(RunnerError::UnknownVerb(line.to_string())),
        };
        Ok(verb)
    }
}

/// Whether the console keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the console.
    Quit,
}

/// Maps console verbs onto fleet operations and prints their results.
#[derive(Debug)]
pub struct Console {
    fleet: Fleet,
}

impl Console {
    /// Create a console driving `fleet`.
    pub fn new(fleet: Fleet) -> Self {
        Console { fleet }
    }

    /// The fleet being driven.
    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Read lines from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> RunnerResult<()> {
        let mut line = String::new();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }
            if self.run_line(&line, out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Parse and execute one line. Parse errors are printed, not returned.
    pub fn run_line<W: Write>(&mut self, line: &str, out: &mut W) -> RunnerResult<Flow> {
        match line.parse::<Verb>() {
            Ok(verb) => self.execute(verb, out),
            Err(e) => {
                writeln!(out, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute one verb.
    ///
    /// Fleet failures are printed as one-line diagnoses; only output errors are
    /// returned.
    pub fn execute<W: Write>(&mut self, verb: Verb, out: &mut W) -> RunnerResult<Flow> {
        debug!("executing {:?}", verb);
        match verb {
            Verb::Empty => {}
            Verb::Quit => {
                writeln!(out, "quitting...")?;
                return Ok(Flow::Quit);
            }
            Verb::Help => write!(out, "{}", report::help_text())?,
            Verb::Config => self.config(out)?,
            Verb::Find => {
                writeln!(out, "searching...")?;
                let count = self.fleet.discover();
                writeln!(out, "{}", report::discovery_summary(count))?;
            }
            Verb::FindTtm => {
                writeln!(out, "searching...")?;
                let ttm = self.fleet.find_ttm();
                writeln!(out, "{}", report::ttm_location(ttm.as_deref()))?;
            }
            Verb::List => write!(out, "{}", report::device_list(self.fleet.devices()))?,
            Verb::Reset => {
                if !self.ensure_discovered(out)? {
                    return Ok(Flow::Continue);
                }
                writeln!(out, "resetting thread devices...")?;
                let result = self.fleet.soft_reset_all_devices();
                write!(out, "{}", report::fleet_summary("reset", &result))?;
            }
            Verb::Reboot => {
                if !self.ensure_discovered(out)? {
                    return Ok(Flow::Continue);
                }
                writeln!(out, "rebooting thread devices...")?;
                let result = self.fleet.reset_all_devices();
                write!(out, "{}", report::fleet_summary("reboot", &result))?;
            }
            Verb::Restart => {
                if !self.require_devices(out)? {
                    return Ok(Flow::Continue);
                }
                writeln!(out, "restarting thread devices...")?;
                let result = self.fleet.soft_restart_all_devices();
                write!(out, "{}", report::fleet_summary("restart", &result))?;
            }
            Verb::Start => {
                if !self.require_devices(out)? {
                    return Ok(Flow::Continue);
                }
                writeln!(out, "starting thread devices...")?;
                let result = self.fleet.start_all();
                write!(out, "{}", report::fleet_summary("start", &result))?;
            }
            Verb::Stop => {
                if !self.require_devices(out)? {
                    return Ok(Flow::Continue);
                }
                writeln!(out, "stopping thread devices...")?;
                let result = self.fleet.stop_all();
                write!(out, "{}", report::fleet_summary("stop", &result))?;
            }
            Verb::State => {
                self.fleet.discover();
                let statuses = self.fleet.show_device_state();
                write!(out, "{}", report::state_lines(&statuses))?;
            }
            Verb::TtmPower(dbm) => match self.fleet.set_ttm_tx_power(dbm) {
                Ok(outcome) if outcome.status.is_done() => writeln!(out, "done")?,
                Ok(outcome) => write!(out, "{}", report::outcome_line(&outcome))?,
                Err(FleetError::DeviceNotFound { .. }) => {
                    writeln!(out, "unable to find TTM device!")?
                }
                Err(e) => writeln!(out, "{}", e.diagnosis())?,
            },
            Verb::Send(command) => match self.fleet.broadcast(&command) {
                Ok(result) => write!(out, "{}", report::broadcast_groups(&result))?,
                Err(e) => writeln!(out, "{}", e.diagnosis())?,
            },
            Verb::Ports => match self.fleet.list_ports() {
                Ok(ports) => write!(out, "{}", report::port_list(&ports))?,
                Err(e) => writeln!(out, "{}", e.diagnosis())?,
            },
        }
        Ok(Flow::Continue)
    }

    fn config<W: Write>(&mut self, out: &mut W) -> RunnerResult<()> {
        writeln!(out, "finding openthread devices...")?;
        let count = self.fleet.discover();
        writeln!(out, "{}", report::discovery_summary(count))?;
        if count == 0 {
            return Ok(());
        }

        writeln!(out, "configuring thread network:")?;
        match self.fleet.configure_network() {
            Ok(result) => {
                write!(out, "{}", report::topology_summary(self.fleet.devices()))?;
                write!(out, "{}", report::fleet_summary("configure", &result))?;
            }
            Err(e) => writeln!(out, "{}", e.diagnosis())?,
        }
        Ok(())
    }

    /// Discover first if nothing is known yet. Returns whether any device is known.
    fn ensure_discovered<W: Write>(&mut self, out: &mut W) -> RunnerResult<bool> {
        if self.fleet.device_count() == 0 {
            writeln!(out, "searching...")?;
            self.fleet.discover();
        }
        self.require_devices(out)
    }

    fn require_devices<W: Write>(&self, out: &mut W) -> RunnerResult<bool> {
        if self.fleet.device_count() == 0 {
            writeln!(out, "you need to find thread devices first!")?;
            return Ok(false);
        }
        Ok(true)
    }
}
