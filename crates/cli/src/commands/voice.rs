//! Offline voice rule checks.
//!
//! Runs a transcript through the same rules the storefront uses, without a
//! backend, so phrase changes can be tried from a terminal.
//!
//! ```bash
//! jq-cli voice classify "urutkan dari yang termurah"
//! ```

use juicequ_storefront::voice;

/// Print what the rules make of `transcript`.
#[allow(clippy::print_stdout)]
pub fn classify(transcript: &str) {
    let normalized = voice::normalize(transcript);
    println!("normalized: {normalized}");

    match voice::classify(transcript) {
        Some(command) => {
            println!("intent:     {:?}", command.intent());
            println!("command:    {command:?}");
        }
        None => println!("no rule matched, the assistant would handle this"),
    }
}
