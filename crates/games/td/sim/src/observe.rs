use crate::game::GameSession;
use crate::tower::tower_id_to_u64;
use crate::wave::WavePhase;
use td_types::{
    MonsterSnapshot, PlayerSnapshot, SessionSnapshot, ShotEventSnapshot, TowerSnapshot,
    WavePhaseInfo,
};

pub fn wave_phase_info(session: &GameSession) -> WavePhaseInfo {
    let wave = session.wave();
    let running = wave.running().len() as u32;
    match wave.phase() {
        WavePhase::Spawning => WavePhaseInfo::Spawning {
            pending: wave.pending_len() as u32,
            running,
        },
        WavePhase::Active => WavePhaseInfo::Active { running },
        WavePhase::Cleared => WavePhaseInfo::Cleared,
    }
}

/// Copy the live session state into a standalone snapshot.
pub fn build_snapshot(session: &GameSession) -> SessionSnapshot {
    use td_core::Game;

    SessionSnapshot {
        tick: session.tick(),
        elapsed_ms: session.elapsed().as_millis() as u64,
        wave: session.wave().index(),
        wave_phase: wave_phase_info(session),
        leaks: session.leaks(),
        max_leaks: session.config().max_leaks,
        players: session
            .players()
            .iter()
            .map(|p| PlayerSnapshot {
                id: p.id,
                name: p.name.clone(),
                class: p.class.to_string(),
                score: p.score,
            })
            .collect(),
        monsters: session
            .wave()
            .running()
            .iter()
            .map(|m| MonsterSnapshot {
                id: m.id.0,
                kind: m.kind.clone(),
                position: m.position.to_position(),
                health: m.health,
                max_health: m.max_health,
                path: m.path,
            })
            .collect(),
        towers: session
            .towers()
            .iter()
            .map(|(id, t)| TowerSnapshot {
                id: tower_id_to_u64(id),
                owner: t.owner,
                kind: t.kind.clone(),
                position: t.position.to_position(),
                range: t.range,
                cooldown_ms: t.cooldown.as_millis() as u64,
            })
            .collect(),
        shots: session
            .shots()
            .iter()
            .map(|s| ShotEventSnapshot {
                monster_id: s.monster_id.0,
                tower_id: tower_id_to_u64(s.tower_id),
                offset: s.offset,
            })
            .collect(),
    }
}
