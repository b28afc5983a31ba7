use std::{collections::HashMap, time::Duration};

use pathviz_core::{CellChange, CellState, Position, Update};
use pathviz_system_search::{Algorithm, NoPause, Pacer};
use pathviz_system_streaming::{StreamMode, UpdateChannel};
use pathviz_world::{CellMap, GridWorld};
use proptest::prelude::*;

#[derive(Default)]
struct CountingPacer {
    pauses: usize,
}

impl Pacer for CountingPacer {
    fn pause(&mut self, _delay: Duration) {
        self.pauses += 1;
    }
}

fn replay(updates: &[Update]) -> Vec<CellChange> {
    let mut cells: HashMap<Position, CellState> = HashMap::new();
    for update in updates {
        match update {
            Update::MapReset => cells.clear(),
            Update::Cell(change) => {
                let _ = cells.insert(change.position(), change.state());
            }
            Update::Batch(changes) => {
                for change in changes {
                    let _ = cells.insert(change.position(), change.state());
                }
            }
            Update::RunStarted | Update::RunEnded => {}
        }
    }

    let mut cells: Vec<CellChange> = cells
        .into_iter()
        .filter(|(_, state)| *state != CellState::Empty)
        .map(|(position, state)| CellChange::new(state, position))
        .collect();
    cells.sort_by_key(|change| change.position());
    cells
}

fn searched_channel(mode: StreamMode) -> UpdateChannel<Vec<Update>> {
    let mut channel = UpdateChannel::new(GridWorld::new(12, 8, true), Vec::new(), mode);
    channel.begin_run();
    channel.clear_map();
    channel.hollow_rect(CellState::Wall, 3, 1, 5, 5);
    let _ = channel.put_cell(CellState::Empty, Position::new(5, 1));
    channel
}

#[test]
fn batched_stream_reproduces_world() {
    let mut channel = searched_channel(StreamMode::batched(7));

    let outcome = Algorithm::AStar.search(
        Position::new(0, 0),
        Position::new(5, 3),
        &mut channel,
        Duration::ZERO,
        &mut NoPause,
    );
    channel.end_run();

    assert!(outcome.path().is_empty(), "walls are permanent so the gap stays closed");
    assert_eq!(replay(channel.sink()), channel.world().occupied_cells());
    assert_eq!(channel.sink().first(), Some(&Update::RunStarted));
    assert_eq!(channel.sink().last(), Some(&Update::RunEnded));
    assert!(channel
        .sink()
        .iter()
        .all(|update| !matches!(update, Update::Batch(changes) if changes.len() > 7)));
}

#[test]
fn animated_stream_reproduces_world_and_paces_steps() {
    let mut channel =
        UpdateChannel::new(GridWorld::new(8, 8, true), Vec::new(), StreamMode::Animated);
    channel.begin_run();
    channel.clear_map();
    for y in 0..6 {
        let _ = channel.put_cell(CellState::Wall, Position::new(4, y));
    }
    let mut pacer = CountingPacer::default();

    let outcome = Algorithm::Dijkstra.search(
        Position::new(1, 1),
        Position::new(6, 1),
        &mut channel,
        Duration::from_millis(1),
        &mut pacer,
    );
    channel.end_run();

    assert!(!outcome.path().is_empty());
    assert_eq!(replay(channel.sink()), channel.world().occupied_cells());
    assert!(channel
        .sink()
        .iter()
        .all(|update| !matches!(update, Update::Batch(_))));
    assert_eq!(
        pacer.pauses,
        outcome.evaluated() + outcome.path().len() - 1
    );
}

#[test]
fn search_emits_calculating_before_calculated() {
    let mut channel =
        UpdateChannel::new(GridWorld::new(3, 1, true), Vec::new(), StreamMode::Animated);

    let _ = Algorithm::Dijkstra.search(
        Position::new(0, 0),
        Position::new(2, 0),
        &mut channel,
        Duration::ZERO,
        &mut NoPause,
    );

    let states: Vec<CellState> = channel
        .sink()
        .iter()
        .filter_map(|update| match update {
            Update::Cell(change) if change.position() == Position::new(1, 0) => {
                Some(change.state())
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![CellState::Calculating, CellState::Calculated, CellState::Path]
    );
}

proptest! {
    #[test]
    fn batches_are_full_until_the_final_flush(
        max_batch_size in 1usize..12,
        writes in 0usize..64,
    ) {
        let mut channel = UpdateChannel::new(
            GridWorld::new(64, 1, true),
            Vec::new(),
            StreamMode::batched(max_batch_size),
        );
        for x in 0..writes {
            let x = i32::try_from(x).expect("small index");
            let _ = channel.put_cell(CellState::Calculated, Position::new(x, 0));
        }

        prop_assert_eq!(channel.queued().len(), writes % max_batch_size);
        prop_assert_eq!(channel.sink().len(), writes / max_batch_size);

        channel.end_run();

        let mut delivered = Vec::new();
        let batches: Vec<&Vec<CellChange>> = channel
            .sink()
            .iter()
            .filter_map(|update| match update {
                Update::Batch(changes) => Some(changes),
                _ => None,
            })
            .collect();
        for (index, batch) in batches.iter().enumerate() {
            if index + 1 < batches.len() {
                prop_assert_eq!(batch.len(), max_batch_size);
            } else {
                prop_assert!(!batch.is_empty() && batch.len() <= max_batch_size);
            }
            delivered.extend(batch.iter().map(|change| change.position().x()));
        }
        let expected: Vec<i32> = (0..writes)
            .map(|x| i32::try_from(x).expect("small index"))
            .collect();
        prop_assert_eq!(delivered, expected);
        prop_assert_eq!(channel.sink().last(), Some(&Update::RunEnded));
    }
}

#[test]
fn n_plus_one_writes_leave_one_queued() {
    let max_batch_size = 10;
    let mut channel = UpdateChannel::new(
        GridWorld::new(20, 1, true),
        Vec::new(),
        StreamMode::batched(max_batch_size),
    );

    for x in 0..=10 {
        let _ = channel.put_cell(CellState::Wall, Position::new(x, 0));
    }

    assert_eq!(channel.sink().len(), 1);
    assert!(matches!(
        &channel.sink()[0],
        Update::Batch(changes) if changes.len() == max_batch_size
    ));
    assert_eq!(channel.queued().len(), 1);

    channel.end_run();
    assert!(matches!(&channel.sink()[1], Update::Batch(changes) if changes.len() == 1));
}
