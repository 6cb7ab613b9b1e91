use std::collections::HashMap;
use std::io::{self, Write};

use crate::frame::Frame;
use crate::profile::Profile;

/// Writes the legacy gperftools CPU profile layout: an ASCII symbol section
/// naming every distinct frame, then the sample records as 64-bit
/// little-endian words. The layout is documented at
/// <https://gperftools.github.io/gperftools/cpuprofile-fileformat.html>.
pub struct PprofSerializer<'a> {
    /// Name of the profiled process's entry point, written into the symbol
    /// preamble. Injected by the caller; see `process_binary_name`.
    binary_name: &'a str,
}

/// Every multi-byte integer in the format is one 8-byte little-endian word,
/// regardless of the value's natural width.
struct WordWriter<W: Write> {
    out: W,
}

impl<W: Write> WordWriter<W> {
    fn put_word(&mut self, n: u64) -> io::Result<()> {
        self.out.write_all(&n.to_le_bytes())
    }

    fn put_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<'a> PprofSerializer<'a> {
    pub fn new(binary_name: &'a str) -> Self {
        Self { binary_name }
    }

    /// Serialize `profile` to `out`. Any write failure aborts the encode;
    /// bytes already written are not rolled back, discarding the sink on
    /// failure is the caller's responsibility.
    pub fn serialize<W: Write>(&self, profile: &Profile, out: W) -> io::Result<()> {
        let mut word = WordWriter { out };

        // Symbol section: assign each distinct frame a sequential 1-based id
        // in first-encounter order. `StackCounts` iterates in first-encounter
        // order itself, so repeated encodes of one profile are byte-identical.
        let mut uniq: HashMap<&Frame, u64> = HashMap::new();
        let mut next: u64 = 1;
        word.put_str(&format!("--- symbol\nbinary={}\n", self.binary_name))?;
        for (stack, _) in profile.counts.iter() {
            for frame in stack {
                if !uniq.contains_key(frame) {
                    word.put_str(&format!("0x{:016x} {}\n", next, frame))?;
                    uniq.insert(frame, next);
                    next += 1;
                }
            }
        }
        word.put_str("---\n--- profile\n")?;

        // Fixed header of the legacy layout.
        for w in [0u64, 3, 0, 1, 0] {
            word.put_word(w)?;
        }

        // One record per aggregated stack: count, depth, then the frames'
        // symbol ids in capture order.
        for (stack, count) in profile.counts.iter() {
            if stack.is_empty() {
                continue;
            }
            word.put_word(count)?;
            word.put_word(stack.len() as u64)?;
            for frame in stack {
                word.put_word(uniq[frame])?;
            }
        }

        // End-of-profile marker.
        for w in [0u64, 1, 0] {
            word.put_word(w)?;
        }
        word.flush()
    }
}

/// Best-effort name of the running process's executable, for the symbol
/// preamble. Lookup failure yields the sentinel `"unknown"` rather than
/// failing the encode.
pub fn process_binary_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unknown".to_owned())
}
