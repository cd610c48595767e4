//! Solver statistics tracking.

use std::time::Instant;

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_out_cnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;
        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );
        if result == 0 {
            Some(info.assume_init().resident_size)
        } else {
            None
        }
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Counters collected while exploring and solving.
#[derive(Debug, Default)]
pub struct SolverStats {
    /// Reachable states
    pub states: u64,
    /// Legal placements between them
    pub edges: u64,
    /// Deepest BFS level
    pub max_depth: u64,

    /// Finished games, by winner
    pub x_terminals: u64,
    pub o_terminals: u64,

    /// Parents of the previous level examined while scoring a level
    pub nodes_processed: u64,
    /// Examined parents that were already scored or still undecided
    pub skipped_candidates: u64,

    /// Final outcome breakdown
    pub x_wins: u64,
    pub o_wins: u64,
    pub draws: u64,

    /// Longest forced win found, in plies
    pub max_distance: u64,

    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_processed: u64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a finished game found in the graph.
    pub fn record_terminal(&mut self, x_won: bool) {
        if x_won {
            self.x_terminals += 1;
        } else {
            self.o_terminals += 1;
        }
    }

    /// Record the final score of a state.
    pub fn record_score(&mut self, score: f64) {
        if score > 0.0 {
            self.x_wins += 1;
        } else if score < 0.0 {
            self.o_wins += 1;
        } else {
            self.draws += 1;
        }
    }

    /// Nodes processed per second since the start.
    pub fn nodes_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.nodes_processed as f64 / elapsed;
            }
        }
        0.0
    }

    pub fn should_log(&self, interval_secs: u64) -> bool {
        match self.last_log_time {
            Some(last) => last.elapsed().as_secs() >= interval_secs,
            None => true,
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, resolved: usize, queued: usize) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        let rate = match self.last_log_time {
            Some(last) => {
                let elapsed = last.elapsed().as_secs_f64();
                let processed = self.nodes_processed - self.last_log_processed;
                if elapsed > 0.0 {
                    processed as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => self.nodes_per_sec(),
        };

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{:02}:{:02}:{:02}] processed={} resolved={}/{} queued={} rate={:.0}/s{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.nodes_processed,
            resolved,
            self.states,
            queued,
            rate,
            mem_str,
        );

        self.last_log_time = Some(now);
        self.last_log_processed = self.nodes_processed;
    }

    pub fn print_summary(&self) {
        println!("States: {}", self.states);
        println!("Edges: {}", self.edges);
        println!("Max BFS depth: {}", self.max_depth);
        println!("Terminal positions: {}", self.x_terminals + self.o_terminals);
        println!("  - X wins: {}", self.x_terminals);
        println!("  - O wins: {}", self.o_terminals);
        println!(
            "Candidates examined: {} ({} skipped)",
            self.nodes_processed, self.skipped_candidates
        );
        println!("Scores:");
        println!("  - X wins: {}", self.x_wins);
        println!("  - O wins: {}", self.o_wins);
        println!("  - Draws: {}", self.draws);
        println!("Longest forced win: {} plies", self.max_distance);

        if let Some(start) = self.start_time {
            println!("Elapsed: {:.2}s", start.elapsed().as_secs_f64());
        }
        if let Some(mem) = get_memory_usage() {
            println!("Memory: {}", format_bytes(mem));
        }
    }
}
