use criterion::{Criterion, criterion_group, criterion_main};
use euchre_core::game::state::{GameState, NewGameOptions};
use euchre_core::{BidAction, PlayerPosition};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn play_hand(seed: u64) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    let state = GameState::create_new_game_with_rng(
        NewGameOptions::new(["a", "b", "c", "d"]).with_dealer(PlayerPosition::North),
        &mut rng,
    );
    let state = state
        .make_trump_bid(PlayerPosition::East, BidAction::OrderUp, None, false, None)
        .expect("order up");
    let discard = state.hand(PlayerPosition::North).cards()[0];
    let mut state = state.dealer_discard(discard).expect("discard");
    while state.play_state().is_some() {
        let seat = state.next_player().expect("seat");
        let card = state.valid_cards_for_play(seat)[0];
        state = state.play_card(seat, card, None).expect("play");
    }
    state
}

fn hand_flow_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("hand_flow");
    for seed in [7u64, 42, 1337] {
        group.bench_function(format!("first_legal_{seed}"), |b| {
            b.iter(|| black_box(play_hand(seed)))
        });
    }
    group.bench_function("snapshot_json_roundtrip", |b| {
        let state = play_hand(7);
        b.iter(|| {
            let json = state.to_json().expect("encode");
            black_box(GameState::from_json(&json).expect("decode"))
        })
    });
    group.finish();
}

criterion_group!(benches, hand_flow_bench);
criterion_main!(benches);
