// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
                                  _
  ____ _____ ____   ___  _   _(_) _____      __
 / _  | ___ |  _ \ / _ \| | | | |/ _ \ \ /\ / /
( (_| | ____| | | | (_) |\ V /| |  __/\ V  V /
 \___ |_____)_| |_|\___/  \_/ |_|\___| \_/\_/
(_____|
        Genomic Prediction API Client
"#;
    println!("{}", banner);
}
