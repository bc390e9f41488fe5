//! Fuzz target: `Command::decode`
//!
//! Drives arbitrary receive payloads through the command decoder and
//! asserts that it never panics, that only a value of one switches the
//! indicator on, and that the reply always matches the decoded level.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use ledlink::app::commands::{Command, parse_decimal};
use ledlink::config::RX_BUFFER_LEN;

fuzz_target!(|data: &[u8]| {
    // The service never hands the decoder more than one receive buffer.
    let data = &data[..data.len().min(RX_BUFFER_LEN)];

    let cmd = Command::decode(data);
    assert_eq!(cmd == Command::On, parse_decimal(data) == 1);
    assert_eq!(cmd.level(), cmd == Command::On);

    let expected = if cmd.level() { "Led turned on" } else { "Led turned off" };
    assert_eq!(cmd.reply(), expected);
});
