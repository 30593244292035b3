use serde::Serialize;
use std::time::Instant;

/// The three phases of a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Load,
    Aggregate,
    Render,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Aggregate => "aggregate",
            Phase::Render => "render",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseStats {
    pub phase: Phase,
    pub elapsed_ms: f64,
    /// Resident memory at the end of the phase; only sampled with `--monitor`.
    pub memory_mb: Option<u64>,
}

/// Timings collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub phases: Vec<PhaseStats>,
    pub total_ms: f64,
    pub peak_memory_mb: Option<u64>,
}

impl RunStats {
    pub fn render_text(&self) -> String {
        let mut out = String::from("\nRun Statistics:\n");
        for stats in &self.phases {
            out.push_str(&format!("   {:<12} {:>10.1} ms", stats.phase.label(), stats.elapsed_ms));
            if let Some(mb) = stats.memory_mb {
                out.push_str(&format!("  {} MB", mb));
            }
            out.push('\n');
        }
        out.push_str(&format!("   {:<12} {:>10.1} ms", "total", self.total_ms));
        if let Some(mb) = self.peak_memory_mb {
            out.push_str(&format!("  peak {} MB", mb));
        }
        out.push('\n');
        out
    }
}

/// Clocks each phase of a run and, when asked, samples process memory.
pub struct PhaseMonitor {
    sampler: Option<MemorySampler>,
    run_start: Instant,
    phase_start: Instant,
    stats: RunStats,
}

impl PhaseMonitor {
    pub fn start(sample_memory: bool) -> Self {
        let now = Instant::now();
        Self {
            sampler: if sample_memory { MemorySampler::new() } else { None },
            run_start: now,
            phase_start: now,
            stats: RunStats::default(),
        }
    }

    pub fn finish_phase(&mut self, phase: Phase) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.phase_start).as_secs_f64() * 1000.0;
        self.phase_start = now;

        let memory_mb = self.sampler.as_mut().and_then(MemorySampler::resident_mb);
        if let Some(mb) = memory_mb {
            let peak = self.stats.peak_memory_mb.get_or_insert(mb);
            *peak = (*peak).max(mb);
            tracing::info!("📊 {} finished in {:.1} ms, memory {} MB", phase.label(), elapsed_ms, mb);
        } else {
            tracing::debug!("{} finished in {:.1} ms", phase.label(), elapsed_ms);
        }

        self.stats.phases.push(PhaseStats {
            phase,
            elapsed_ms,
            memory_mb,
        });
    }

    pub fn finish(mut self) -> RunStats {
        self.stats.total_ms = self.run_start.elapsed().as_secs_f64() * 1000.0;
        self.stats
    }
}

#[cfg(feature = "cli")]
struct MemorySampler {
    system: sysinfo::System,
    pid: sysinfo::Pid,
}

#[cfg(feature = "cli")]
impl MemorySampler {
    fn new() -> Option<Self> {
        match sysinfo::get_current_pid() {
            Ok(pid) => Some(Self {
                system: sysinfo::System::new(),
                pid,
            }),
            Err(e) => {
                tracing::warn!("Process statistics unavailable: {}", e);
                None
            }
        }
    }

    fn resident_mb(&mut self) -> Option<u64> {
        self.system
            .refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        self.system.process(self.pid).map(|p| p.memory() / 1024 / 1024)
    }
}

// 非 CLI 建置不取樣記憶體
#[cfg(not(feature = "cli"))]
struct MemorySampler;

#[cfg(not(feature = "cli"))]
impl MemorySampler {
    fn new() -> Option<Self> {
        None
    }

    fn resident_mb(&mut self) -> Option<u64> {
        None
    }
}
