use crate::profile::Profile;

/// JSON rendering of an aggregated profile, for inspecting a run without
/// pprof tooling. Stacks appear in the same deterministic order the binary
/// encoder uses.
#[derive(Debug, Deserialize, Serialize)]
pub struct JsonProfile {
    pub stacks: Vec<JsonStack>,
    pub ticks: u64,
    pub missed_ticks: u64,
    pub elapsed_ms: u128,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct JsonStack {
    /// Frame labels, innermost first.
    pub frames: Vec<String>,
    pub count: u64,
}

pub struct JsonSerializer;

impl JsonSerializer {
    pub fn serialize(profile: &Profile) -> String {
        let stacks = profile
            .counts
            .iter()
            .map(|(stack, count)| JsonStack {
                frames: stack.iter().map(|frame| frame.to_string()).collect(),
                count,
            })
            .collect();
        serde_json::to_string(&JsonProfile {
            stacks,
            ticks: profile.ticks,
            missed_ticks: profile.missed_ticks,
            elapsed_ms: profile.elapsed.as_millis(),
        })
        .unwrap()
    }
}
