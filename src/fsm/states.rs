//! Concrete state handler functions and table builder.
//!
//! ```text
//!          ┌──[deadline passed]──────────────────────────┐
//!          │                                             ▼
//!  IDLE ──[check window or frame]──▶ SAMPLING ──▶ DECIDING ──[trend agrees
//!    ▲                                                │        with frame,
//!    │                                     [no action]│        or deadline]──▶ ACTUATING
//!    └────────────────────────────────────────────────┘                            │
//!    ▲                                                                             │
//!    └─────────────────────────────────────────────────────────────────────────────┘
//! ```

use log::{debug, info};

use super::context::{Decision, FsmContext};
use super::{StateDescriptor, StateId};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::Sampling,
            name: "Sampling",
            on_enter: None,
            on_exit: None,
            on_update: sampling_update,
        },
        StateDescriptor {
            id: StateId::Deciding,
            name: "Deciding",
            on_enter: None,
            on_exit: None,
            on_update: deciding_update,
        },
        StateDescriptor {
            id: StateId::Actuating,
            name: "Actuating",
            on_enter: Some(actuating_enter),
            on_exit: Some(actuating_exit),
            on_update: actuating_update,
        },
    ]
}

/// Deadline-forced action for the current tick, if one applies.
fn forced_decision(ctx: &FsmContext) -> Option<Decision> {
    ctx.schedule
        .limit_action(ctx.now.time(), &ctx.door)
        .map(|action| Decision {
            action,
            forced: true,
        })
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.pending = None;
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(decision) = forced_decision(ctx) {
        info!("IDLE: past deadline with door {}, forcing {}", ctx.door.state, decision.action);
        ctx.pending = Some(decision);
        return Some(StateId::Actuating);
    }

    if ctx.schedule.should_sample(ctx.now.time()) {
        return Some(StateId::Sampling);
    }

    // Outside every sampling span the old readings describe another day.
    if !ctx.window.is_empty() {
        debug!("IDLE: discarding {} stale readings", ctx.window.len());
        ctx.window.clear();
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAMPLING
// ═══════════════════════════════════════════════════════════════════════════

fn sampling_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(reading) = ctx.reading.take() {
        ctx.window.push(reading);
    }
    Some(StateId::Deciding)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DECIDING
// ═══════════════════════════════════════════════════════════════════════════

fn deciding_update(ctx: &mut FsmContext) -> Option<StateId> {
    let now = ctx.now.time();
    ctx.last_trend = ctx.window.trend();

    let candidate = ctx.last_trend.and_then(|t| t.candidate_action());
    let permitted = ctx.schedule.permitted_action(now, &ctx.door);

    if let Some(action) = candidate.filter(|&c| Some(c) == permitted) {
        info!("DECIDING: trend {:?} confirms {}", ctx.last_trend, action);
        ctx.pending = Some(Decision {
            action,
            forced: false,
        });
        return Some(StateId::Actuating);
    }

    if let Some(decision) = forced_decision(ctx) {
        info!("DECIDING: deadline passed, forcing {}", decision.action);
        ctx.pending = Some(decision);
        return Some(StateId::Actuating);
    }

    debug!(
        "DECIDING: no action (trend {:?}, frame permits {:?}, {}/{} readings)",
        ctx.last_trend,
        permitted,
        ctx.window.len(),
        ctx.window.capacity()
    );
    Some(StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTUATING
// ═══════════════════════════════════════════════════════════════════════════

fn actuating_enter(ctx: &mut FsmContext) {
    if let Some(decision) = ctx.pending {
        info!(
            "ACTUATING: {} ({})",
            decision.action,
            if decision.forced { "deadline" } else { "trend" }
        );
    }
}

fn actuating_exit(ctx: &mut FsmContext) {
    ctx.pending = None;
    ctx.window.clear();
}

fn actuating_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Idle)
}
