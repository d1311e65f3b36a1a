use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::{Catalog, Equipment, GameState, ServerSlot, SimConfig};
use sim_econ::{Command, Engine};

/// A late-game campus: every slot filled so a tick walks the whole state.
fn busy_engine() -> Engine {
    let catalog = Catalog::standard();
    let mut state = GameState::new(&catalog, &SimConfig::default());
    state.generator_level = 10;
    state.server_room_level = 10;
    state.server_slots = vec![
        Some(ServerSlot {
            type_id: "tower".into(),
            grade: 3,
        });
        30
    ];
    for room in state.classrooms.values_mut() {
        room.level = 5;
        room.pcs = vec![Some(Equipment { level: 3 }); 8];
        room.network = vec![Some(Equipment::NEW)];
        room.teachers = vec![Some(Equipment::NEW); 3];
    }
    state.cooling_slots = vec![Some(Equipment::NEW)];
    state.backup_slots = vec![Some(Equipment::NEW); 3];
    for room in &mut state.rooms {
        room.unlocked = true;
    }
    Engine::from_state(catalog, SimConfig::default(), state).unwrap()
}

fn bench_ticks(c: &mut Criterion) {
    let mut engine = busy_engine();
    c.bench_function("campus_tick", |b| {
        b.iter(|| {
            let _ = sim_runtime::fast_forward(&mut engine, 1);
        })
    });
}

fn bench_commands(c: &mut Criterion) {
    let mut engine = busy_engine();
    c.bench_function("rejected_purchase", |b| {
        b.iter(|| {
            // every slot is taken, so this walks validation and rejects
            let _ = engine.execute(Command::BuyServer {
                asset: "tower".into(),
            });
        })
    });
}

criterion_group!(benches, bench_ticks, bench_commands);
criterion_main!(benches);
