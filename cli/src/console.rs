//! Terminal rendering of rate updates, loading state and alerts.

use cardfx_common::ExchangeRateSet;
use cardfx_fx::display::{rates_summary, stamp_label, ConversionDisplay, LOADING_MESSAGE};
use cardfx_fx::{RateListener, RateStamp};

/// Prints provider notifications to the terminal.
///
/// Rate lines go to stdout unless `quiet`; loading and alerts go to stderr.
pub struct ConsoleListener {
    quiet: bool,
}

impl ConsoleListener {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl RateListener for ConsoleListener {
    fn on_rates_updated(&self, rates: &ExchangeRateSet, stamp: &RateStamp) {
        if self.quiet {
            return;
        }
        println!("Rates:        {}", rates_summary(rates));
        println!("Last updated: {}", stamp_label(stamp));
    }

    fn on_loading(&self, loading: bool) {
        if loading {
            eprintln!("{}", LOADING_MESSAGE);
        }
    }

    fn on_alert(&self, message: &str) {
        eprintln!("[!] {}", message);
    }
}

/// Print a conversion breakdown as aligned rows.
pub fn print_breakdown(display: &ConversionDisplay) {
    let rows = [
        ("Original amount", &display.original_amount),
        ("Exchange rate", &display.rate),
        ("Converted", &display.converted),
        ("Card fee", &display.card_fee),
        ("Foreign fee", &display.foreign_fee),
        ("Total", &display.total),
    ];

    println!();
    for (label, value) in rows {
        println!("{:<16}{}", label, value);
    }
}
