use std::collections::BTreeSet;
use std::ops::ControlFlow;

use slide_solver::solve::bfs;
use slide_solver::{
    solve, Direction, GoError, Map, MapError, MoveKind, MoveState, ObstacleKind, Pos,
    ReplayError, Session, Status,
};

use Direction::*;

fn map(s: &str) -> Map {
    s.parse().unwrap()
}

const PUZZLES: &[&str] = &[
    "
    .#...
    .....
    p.%.g
    .#...
    ",
    "
    ....g
    p.^..
    ",
    "
    #.....#
    ..%.>..
    .p...#.
    ...<...
    g.#..%.
    ",
    "
    ..#....
    p......
    #.....#
    ...v..g
    ..#....
    ",
];

#[test]
fn straight_line_takes_one_move() {
    for (s, dir) in [
        ("p...g", Right),
        ("g..p", Left),
        ("g\n.\n.\np", Up),
        ("p\n.\ng", Down),
        ("#...\np..g\n#.#.", Right),
    ] {
        let result = solve(&map(s));
        assert!(result.solvable, "{s}");
        assert_eq!(result.min_moves, 1, "{s}");
        assert_eq!(result.optimal_path, [dir], "{s}");
    }
}

#[test]
fn solving_is_deterministic() {
    for s in PUZZLES {
        let map = map(s);
        assert_eq!(solve(&map), solve(&map));
        assert_eq!(solve(&map), solve(&map.clone()));
    }
}

#[test]
fn optimal_path_replays_to_goal() {
    for s in PUZZLES {
        let map = map(s);
        let result = solve(&map);
        if !result.solvable {
            continue;
        }
        let outcomes = map.replay(&result.optimal_path).unwrap();
        assert_eq!(outcomes.len(), result.min_moves);
        assert!(outcomes.iter().all(|o| !o.is_dead_end() && !o.is_noop()));
        assert!(outcomes.last().unwrap().reached_goal());
    }
}

#[test]
fn unsolvable_map_reports_nothing() {
    let result = solve(&map("p#g"));
    assert!(!result.solvable);
    assert_eq!(result.min_moves, 0);
    assert!(result.optimal_path.is_empty());
}

#[test]
fn wall_next_to_start_is_a_noop() {
    let map = map("
        #...
        ...g
        p#..
    ");
    let start = map.player();
    let outcome = map.resolve(&BTreeSet::new(), start, Right, None).unwrap();
    assert_eq!(outcome.kind, MoveKind::Blocked);
    assert_eq!(outcome.to, start);
    assert!(outcome.is_noop());

    let state = MoveState::initial(&map);
    assert_eq!(state.apply(&state.resolve(&map, Right)), state);

    let mut session = Session::new(&map);
    session.go(Right).unwrap();
    assert_eq!(session.moves(), 0);
    assert_eq!(session.state(), &state);

    // The solver must never spend a move on it.
    let result = solve(&map);
    assert_eq!(result.optimal_path, [Up, Right]);
    assert!(map.replay(&result.optimal_path).is_ok());
}

#[test]
fn breakable_wall_breaks_on_second_push() {
    let map = map("
        ....g
        p.%.#
    ");
    let wall = Pos::new(2, 0);
    let broken = BTreeSet::new();

    let first = map.resolve(&broken, map.player(), Right, None).unwrap();
    assert_eq!(first.kind, MoveKind::Stopped);
    assert_eq!(first.to, Pos::new(1, 0));
    assert_eq!(first.pending, Some(wall));
    assert!(!first.wall_just_broken());

    let second = map.resolve(&broken, first.to, Right, first.pending).unwrap();
    assert_eq!(second.kind, MoveKind::Stopped);
    assert_eq!(second.broke, Some(wall));
    assert_eq!(second.to, Pos::new(3, 0));
    assert_eq!(second.pending, None);

    let mut session = Session::new(&map);
    session.go(Right).unwrap();
    session.go(Right).unwrap();
    assert_eq!(session.state().pos(), Pos::new(3, 0));
    assert!(session.state().broken().contains(&wall));
    assert_eq!(session.moves(), 2);
}

#[test]
fn unmarked_breakable_wall_in_front_is_a_noop() {
    let map = map("
        p....
        .....
        .%..g
        #....
    ");
    let landing = Pos::new(0, 1);
    let outcome = map.resolve(&BTreeSet::new(), landing, Right, None).unwrap();
    assert_eq!(outcome.kind, MoveKind::Blocked);
    assert_eq!(outcome.to, landing);
    assert_eq!(outcome.pending, None);
    assert!(outcome.is_noop());

    let mut session = Session::new(&map);
    session.go(Down).unwrap();
    assert_eq!(session.state().pos(), landing);
    let before = session.state().clone();
    session.go(Right).unwrap();
    assert_eq!(session.state(), &before);
    assert_eq!(session.moves(), 1);

    // Pushing on the unmarked wall is the only way on, and it goes nowhere.
    assert!(!solve(&map).solvable);
    assert_eq!(map.replay(&[Down, Right, Right]), Err(ReplayError::Blocked(1)));
}

#[test]
fn breakable_wall_next_to_spawn_is_marked() {
    let map = map("
        ....g
        p%.#.
    ");
    let mut session = Session::new(&map);
    assert_eq!(session.state().pending(), Some(Pos::new(1, 0)));

    session.go(Right).unwrap();
    session.go(Right).unwrap();
    assert_eq!(session.state().pos(), Pos::new(2, 0));
    assert!(session.state().broken().contains(&Pos::new(1, 0)));
    assert_eq!(session.moves(), 1);
}

#[test]
fn turning_away_keeps_breakable_wall() {
    let map = map("
        .#...
        .....
        p.%.g
        .#...
    ");
    let wall = Pos::new(2, 1);
    let broken = BTreeSet::new();

    let arrive = map.resolve(&broken, map.player(), Right, None).unwrap();
    assert_eq!(arrive.to, Pos::new(1, 1));
    assert_eq!(arrive.pending, Some(wall));
    let away = map.resolve(&broken, arrive.to, Up, arrive.pending).unwrap();
    assert_eq!(away.kind, MoveKind::Stopped);
    assert_eq!(away.to, Pos::new(1, 2));
    assert_eq!(away.broke, None);
    assert_eq!(away.pending, None);

    let mut session = Session::new(&map);
    for dir in [Right, Up, Down, Right] {
        session.go(dir).unwrap();
    }
    // Back next to the wall, but the mark is gone and the last push did nothing.
    assert_eq!(session.state().pos(), Pos::new(1, 1));
    assert!(session.state().broken().is_empty());
    assert_eq!(session.state().pending(), None);
    assert_eq!(session.moves(), 3);
}

#[test]
fn blocked_slide_exit_is_invalid() {
    let walled = map("
        ..#..
        p.v.g
        ..#..
    ");
    let outcome = walled
        .resolve(&BTreeSet::new(), walled.player(), Right, None)
        .unwrap();
    assert_eq!(outcome.kind, MoveKind::InvalidSlideExit);
    assert_eq!(outcome.to, Pos::new(2, 1));
    assert!(outcome.is_dead_end());
    assert!(!outcome.is_noop() && !outcome.reached_goal());
    assert!(!solve(&walled).solvable);

    let edge = map("
        p.>
        g..
    ");
    let outcome = edge
        .resolve(&BTreeSet::new(), edge.player(), Right, None)
        .unwrap();
    assert_eq!(outcome.kind, MoveKind::InvalidSlideExit);
    assert_eq!(edge.replay(&[Right]), Err(ReplayError::DeadEnd(0, MoveKind::InvalidSlideExit)));

    let result = solve(&edge);
    assert!(result.solvable);
    assert_eq!(result.optimal_path, [Down]);
}

#[test]
fn slide_exit_onto_goal_wins() {
    let map = map("
        ..g
        p.^
    ");
    let outcome = map.resolve(&BTreeSet::new(), map.player(), Right, None).unwrap();
    assert!(outcome.reached_goal());
    assert_eq!(outcome.to, map.goal());
    assert_eq!(solve(&map).min_moves, 1);
}

#[test]
fn slide_wall_hops_only_once() {
    let map = map("
        .....
        .....
        p.^.g
    ");
    let outcome = map.resolve(&BTreeSet::new(), map.player(), Right, None).unwrap();
    assert_eq!(outcome.kind, MoveKind::Stopped);
    assert_eq!(outcome.to, Pos::new(2, 1));
}

#[test]
fn falling_off_the_board() {
    let map = map("
        ..g
        p..
    ");
    let outcome = map.resolve(&BTreeSet::new(), map.player(), Left, None).unwrap();
    assert!(outcome.out_of_bounds());
    assert_eq!(outcome.to, Pos::new(-1, 0));

    let mut session = Session::new(&map);
    session.go(Down).unwrap();
    assert_eq!(session.status(), Status::Fell);
    assert_eq!(session.go(Up), Err(GoError::GameOver(Status::Fell)));
    session.reset();
    assert_eq!(session.status(), Status::Playing);
    assert_eq!(session.moves(), 0);
}

#[test]
fn session_stops_after_winning() {
    let map = map("p..g");
    let mut session = Session::new(&map);
    assert!(session.go(Right).unwrap().reached_goal());
    assert_eq!(session.status(), Status::Won);
    assert_eq!(session.go(Left), Err(GoError::GameOver(Status::Won)));
}

#[test]
fn replay_rejects_bad_paths() {
    let map = map("
        #...
        ...g
        p#..
    ");
    assert_eq!(map.replay(&[]), Err(ReplayError::NotSolved));
    assert_eq!(map.replay(&[Right]), Err(ReplayError::Blocked(0)));
    assert_eq!(map.replay(&[Down]), Err(ReplayError::DeadEnd(0, MoveKind::OutOfBounds)));
    assert_eq!(map.replay(&[Up, Right, Left]), Err(ReplayError::PastGoal(1)));
    assert!(map.replay(&[Up, Right]).is_ok());
}

#[test]
fn search_can_be_interrupted() {
    let map = map(PUZZLES[2]);
    assert_eq!(bfs(&map, || ControlFlow::Break(())), None);

    let mut steps = 0;
    let result = bfs(&map, || {
        steps += 1;
        ControlFlow::Continue(())
    });
    assert_eq!(result.map(|r| r.explored), Some(steps));
}

#[test]
fn malformed_maps_are_rejected() {
    use ObstacleKind::*;

    let p = Pos::new(0, 0);
    assert_eq!(
        Map::new(0, 3, p, []),
        Err(MapError::InvalidSize { width: 0, height: 3 })
    );
    assert_eq!(Map::new(3, 1, p, [(Pos::new(1, 0), Wall)]), Err(MapError::MissingGoal));
    assert_eq!(
        Map::new(3, 1, p, [(Pos::new(1, 0), Goal), (Pos::new(2, 0), Goal)]),
        Err(MapError::MultipleGoals(Pos::new(1, 0), Pos::new(2, 0)))
    );
    assert_eq!(
        Map::new(3, 1, p, [(p, Goal)]),
        Err(MapError::PlayerOnObstacle(p))
    );
    assert_eq!(
        Map::new(3, 1, p, [(Pos::new(3, 0), Goal)]),
        Err(MapError::OutOfRange(Pos::new(3, 0)))
    );
    assert_eq!(
        Map::new(3, 1, Pos::new(0, -1), [(Pos::new(2, 0), Goal)]),
        Err(MapError::OutOfRange(Pos::new(0, -1)))
    );
    assert_eq!(
        Map::new(3, 1, p, [(Pos::new(1, 0), Wall), (Pos::new(1, 0), Goal)]),
        Err(MapError::DuplicateCell(Pos::new(1, 0)))
    );

    assert!("p..\n.g".parse::<Map>().is_err());
    assert!("p.x.g".parse::<Map>().is_err());
    assert!("p.p.g".parse::<Map>().is_err());
    assert!("...g".parse::<Map>().is_err());
}

#[test]
fn resolve_rejects_bad_start() {
    let map = map("p.#.g");
    let broken = BTreeSet::new();
    assert_eq!(
        map.resolve(&broken, Pos::new(5, 0), Left, None),
        Err(MapError::OutOfRange(Pos::new(5, 0)))
    );
    assert_eq!(
        map.resolve(&broken, Pos::new(2, 0), Left, None),
        Err(MapError::Occupied(Pos::new(2, 0)))
    );
}

#[test]
fn text_format_round_trips() {
    for s in PUZZLES {
        let map = map(s);
        assert_eq!(map.to_string().parse::<Map>().unwrap(), map);
    }
}
