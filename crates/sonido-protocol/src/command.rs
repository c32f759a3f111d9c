//! The command grammar itself (§4.4 "Grammar"): parsing a raw input line
//! into a [`Command`], independent of how it is dispatched.

use sonido_core::error::{HostError, HostResult};
use sonido_core::plugin::PluginHandle;

/// Which device/endpoint list a `devices` command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceQuery {
    /// `devices audio-input`.
    AudioInput,
    /// `devices audio-output`.
    AudioOutput,
    /// `devices midi-input`.
    MidiInput,
    /// `devices midi-output`.
    MidiOutput,
}

/// One parsed command line (§4.4 command table).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `start`.
    Start,
    /// `stop`.
    Stop,
    /// `status`.
    Status,
    /// `tone on`.
    ToneOn,
    /// `tone off`.
    ToneOff,
    /// `tone freq <hz>`.
    ToneFreq(f32),
    /// `load-plugin <t:s:m>`.
    LoadPlugin(PluginHandle),
    /// `unload-plugin`.
    UnloadPlugin,
    /// `list-plugins`.
    ListPlugins,
    /// `devices …`.
    Devices(DeviceQuery),
    /// `inspect [timeout_seconds]`.
    Inspect(Option<u64>),
    /// `help`.
    Help,
    /// `quit` / `exit`.
    Quit,
}

/// Parses one line of the command grammar. Whitespace-separated tokens,
/// case-sensitive ASCII; anything that doesn't match a known shape is
/// [`HostError::UnknownCommand`] carrying the original line.
pub fn parse_command(line: &str) -> HostResult<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let unrecognized = || HostError::UnknownCommand { command: line.to_string() };

    match tokens.as_slice() {
        ["start"] => Ok(Command::Start),
        ["stop"] => Ok(Command::Stop),
        ["status"] => Ok(Command::Status),
        ["tone", "on"] => Ok(Command::ToneOn),
        ["tone", "off"] => Ok(Command::ToneOff),
        ["tone", "freq", hz] => {
            let hz: f32 = hz.parse().map_err(|_| unrecognized())?;
            if hz <= 0.0 || hz > 20_000.0 {
                return Err(unrecognized());
            }
            Ok(Command::ToneFreq(hz))
        }
        ["load-plugin", handle] => Ok(Command::LoadPlugin(handle.parse()?)),
        ["unload-plugin"] => Ok(Command::UnloadPlugin),
        ["list-plugins"] => Ok(Command::ListPlugins),
        ["devices", "audio-input"] => Ok(Command::Devices(DeviceQuery::AudioInput)),
        ["devices", "audio-output"] => Ok(Command::Devices(DeviceQuery::AudioOutput)),
        ["devices", "midi-input"] => Ok(Command::Devices(DeviceQuery::MidiInput)),
        ["devices", "midi-output"] => Ok(Command::Devices(DeviceQuery::MidiOutput)),
        ["inspect"] => Ok(Command::Inspect(None)),
        ["inspect", secs] => Ok(Command::Inspect(Some(secs.parse().map_err(|_| unrecognized())?))),
        ["help"] => Ok(Command::Help),
        ["quit"] | ["exit"] => Ok(Command::Quit),
        _ => Err(unrecognized()),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_every_zero_argument_command() {
        assert_eq!(parse_command("start").unwrap(), Command::Start);
        assert_eq!(parse_command("stop").unwrap(), Command::Stop);
        assert_eq!(parse_command("status").unwrap(), Command::Status);
        assert_eq!(parse_command("tone on").unwrap(), Command::ToneOn);
        assert_eq!(parse_command("tone off").unwrap(), Command::ToneOff);
        assert_eq!(parse_command("unload-plugin").unwrap(), Command::UnloadPlugin);
        assert_eq!(parse_command("list-plugins").unwrap(), Command::ListPlugins);
        assert_eq!(parse_command("help").unwrap(), Command::Help);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn tone_freq_rejects_out_of_grammar_range() {
        assert!(parse_command("tone freq 0").is_err());
        assert!(parse_command("tone freq 20001").is_err());
        assert!(parse_command("tone freq 20000").is_ok());
        assert_eq!(parse_command("tone freq 440").unwrap(), Command::ToneFreq(440.0));
    }

    #[test]
    fn load_plugin_parses_the_colon_separated_handle() {
        let cmd = parse_command("load-plugin aufx:dist:acme").unwrap();
        assert_eq!(cmd, Command::LoadPlugin("aufx:dist:acme".parse().unwrap()));
    }

    #[test]
    fn load_plugin_rejects_malformed_handle() {
        assert!(parse_command("load-plugin aufx:dist").is_err());
    }

    #[test]
    fn devices_subcommands_parse_to_the_right_query() {
        assert_eq!(parse_command("devices audio-input").unwrap(), Command::Devices(DeviceQuery::AudioInput));
        assert_eq!(parse_command("devices audio-output").unwrap(), Command::Devices(DeviceQuery::AudioOutput));
        assert_eq!(parse_command("devices midi-input").unwrap(), Command::Devices(DeviceQuery::MidiInput));
        assert_eq!(parse_command("devices midi-output").unwrap(), Command::Devices(DeviceQuery::MidiOutput));
    }

    #[test]
    fn inspect_accepts_an_optional_timeout() {
        assert_eq!(parse_command("inspect").unwrap(), Command::Inspect(None));
        assert_eq!(parse_command("inspect 10").unwrap(), Command::Inspect(Some(10)));
    }

    #[test]
    fn unrecognized_lines_are_rejected_with_the_original_text() {
        let err = parse_command("frobnicate now").unwrap_err();
        assert!(matches!(err, HostError::UnknownCommand { command } if command == "frobnicate now"));
    }

    #[test]
    fn blank_line_is_unrecognized_not_a_panic() {
        assert!(parse_command("").is_err());
        assert!(parse_command("   ").is_err());
    }

    proptest! {
        #[test]
        fn arbitrary_text_never_panics_the_parser(line in ".{0,200}") {
            let _ = parse_command(&line);
        }
    }
}
