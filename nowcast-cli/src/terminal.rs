use nowcast_core::{Alerter, DisplaySurface, Region};
use std::{collections::BTreeMap, io};

/// Collects region texts and prints them as a labelled block.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    texts: BTreeMap<Region, String>,
}

impl TerminalSurface {
    pub fn print(&self, out: &mut impl io::Write) -> io::Result<()> {
        let width = Region::all().iter().map(|r| r.label().len()).max().unwrap_or(0);

        for region in Region::all() {
            if let Some(text) = self.texts.get(region) {
                writeln!(out, "{:>width$}  {}", region.label(), text)?;
            }
        }
        Ok(())
    }
}

impl DisplaySurface for TerminalSurface {
    fn set_text(&mut self, region: Region, text: &str) {
        self.texts.insert(region, text.to_string());
    }
}

/// Alerts go to stderr so they survive stdout redirection.
#[derive(Debug, Default)]
pub struct StderrAlerter;

impl Alerter for StderrAlerter {
    fn alert(&self, message: &str) {
        eprintln!("error: {message}");
    }
}
