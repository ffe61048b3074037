//! Search progress reporting. `Info` is a small, protocol-agnostic record
//! of one iterative-deepening iteration; `to_uci_line` renders it the way
//! a UCI front-end would, but nothing here depends on UCI itself — the
//! protocol layer is out of scope (spec §1).
//!
//! Grounded on the teacher's `uci_info.rs`, trimmed to the fields this
//! crate's search driver actually produces.

#[derive(Clone, Debug, Default)]
pub struct Info {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub time_ms: Option<u128>,
    pub score_cp: Option<i32>,
    pub score_mate: Option<i32>,
    pub best_move: Option<String>,
}

impl Info {
    pub fn to_uci_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = self.depth {
            parts.push(format!("depth {d}"));
        }
        if let Some(n) = self.nodes {
            parts.push(format!("nodes {n}"));
        }
        if let Some(nps) = self.nps {
            parts.push(format!("nps {nps}"));
        }
        if let Some(t) = self.time_ms {
            parts.push(format!("time {t}"));
        }
        if let Some(cp) = self.score_cp {
            parts.push(format!("score cp {cp}"));
        }
        if let Some(mate) = self.score_mate {
            parts.push(format!("score mate {mate}"));
        }
        if let Some(ref mv) = self.best_move {
            parts.push(format!("pv {mv}"));
        }
        if parts.is_empty() {
            "info".to_string()
        } else {
            format!("info {}", parts.join(" "))
        }
    }

    /// Renders the `"depth score best_move"` line spec §6's
    /// `get_search_info` returns.
    pub fn to_search_info_line(&self) -> String {
        format!(
            "{} {} {}",
            self.depth.unwrap_or(0),
            self.score_cp.unwrap_or(0),
            self.best_move.as_deref().unwrap_or("0000"),
        )
    }
}

#[cfg(feature = "logging")]
pub fn trace_iteration(info: &Info) {
    log::debug!("{}", info.to_uci_line());
}

#[cfg(not(feature = "logging"))]
pub fn trace_iteration(_info: &Info) {}
