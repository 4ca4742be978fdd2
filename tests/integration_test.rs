use std::sync::Arc;
use std::time::Duration;
use trivio::game::{BuildStage, FinalRoundStage, GameSnapshot, Placing};
use trivio::protocol::{ClientMessage, ServerMessage};
use trivio::state::AppState;
use trivio::store::MemoryStore;
use trivio::types::{Coordinate, GamePhase, Role, RoundNumber, SetId, TeamId};
use trivio::ws::handlers::handle_message;

async fn host(state: &Arc<AppState>, msg: ClientMessage) -> ServerMessage {
    handle_message(msg, &Role::Host, state)
        .await
        .expect("host commands always get a reply")
}

fn expect_snapshot(msg: ServerMessage) -> GameSnapshot {
    match msg {
        ServerMessage::GameState { snapshot } => *snapshot,
        other => panic!("Expected GameState, got {:?}", other),
    }
}

fn expect_error(msg: ServerMessage, expected: &str) {
    match msg {
        ServerMessage::Error { code, .. } => assert_eq!(code, expected),
        other => panic!("Expected {} error, got {:?}", expected, other),
    }
}

/// Three named categories with five filled clues each
async fn fill_board(state: &Arc<AppState>, round: RoundNumber, names: [&str; 3]) {
    for _ in 0..3 {
        host(state, ClientMessage::BuildSubtractCategory { round }).await;
    }
    for (category, name) in names.iter().enumerate() {
        host(
            state,
            ClientMessage::BuildSetCategoryName {
                round,
                category,
                name: name.to_string(),
            },
        )
        .await;
        for clue in 0..5 {
            host(
                state,
                ClientMessage::BuildSetClue {
                    round,
                    at: Coordinate::new(category, clue),
                    clue: format!("{} clue {}", name, clue + 1),
                    response: format!("{} response {}", name, clue + 1),
                },
            )
            .await;
        }
    }
}

async fn next_stage(state: &Arc<AppState>, expected: BuildStage) {
    match host(state, ClientMessage::BuildNext).await {
        ServerMessage::Build { view } => assert_eq!(view.stage, expected),
        other => panic!("Expected Build view, got {:?}", other),
    }
}

/// Author and publish a set entirely through host messages
async fn build_set(state: &Arc<AppState>, two_rounds: bool) -> SetId {
    host(state, ClientMessage::BuildNew).await;
    if !two_rounds {
        host(
            state,
            ClientMessage::BuildSetHasTwoRounds {
                has_two_rounds: false,
            },
        )
        .await;
    }

    fill_board(state, RoundNumber::One, ["RIVERS", "POETS", "PLANETS"]).await;
    next_stage(state, BuildStage::DailyDoublePlacement(RoundNumber::One)).await;
    host(
        state,
        ClientMessage::BuildToggleDailyDouble {
            round: RoundNumber::One,
            at: Coordinate::new(1, 2),
        },
    )
    .await;

    if two_rounds {
        next_stage(state, BuildStage::CategoryFill(RoundNumber::Two)).await;
        fill_board(state, RoundNumber::Two, ["OPERA", "BIRDS", "CHESS"]).await;
        next_stage(state, BuildStage::DailyDoublePlacement(RoundNumber::Two)).await;
        for at in [Coordinate::new(0, 4), Coordinate::new(2, 3)] {
            host(
                state,
                ClientMessage::BuildToggleDailyDouble {
                    round: RoundNumber::Two,
                    at,
                },
            )
            .await;
        }
    }

    next_stage(state, BuildStage::FinalRoundFill).await;
    host(
        state,
        ClientMessage::BuildSetFinal {
            category: "CAPITALS".to_string(),
            clue: "Ghana's seat of government".to_string(),
            response: "What is Accra?".to_string(),
        },
    )
    .await;
    next_stage(state, BuildStage::Details).await;
    host(
        state,
        ClientMessage::BuildSetTitle {
            title: "Pub Night".to_string(),
        },
    )
    .await;

    // One tag is not enough to publish
    host(
        state,
        ClientMessage::BuildAddTags {
            tags: "general".to_string(),
        },
    )
    .await;
    expect_error(
        host(state, ClientMessage::BuildPublish).await,
        "ILLEGAL_TRANSITION",
    );
    host(
        state,
        ClientMessage::BuildAddTags {
            tags: "pub general".to_string(),
        },
    )
    .await;

    match host(state, ClientMessage::BuildPublish).await {
        ServerMessage::SetSaved { set } => {
            assert!(!set.is_draft);
            assert_eq!(set.tags, vec!["general", "pub"]);
            set.id
        }
        other => panic!("Expected SetSaved, got {:?}", other),
    }
}

async fn add_team(state: &Arc<AppState>, name: &str) -> TeamId {
    match host(
        state,
        ClientMessage::HostAddTeam {
            name: name.to_string(),
            members: vec![format!("{} captain", name)],
            color: "blue".to_string(),
        },
    )
    .await
    {
        ServerMessage::Roster { teams } => teams
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.id.clone())
            .expect("team in roster"),
        other => panic!("Expected Roster, got {:?}", other),
    }
}

/// Play every cell of the current board. Regular clues go to `winner`;
/// daily doubles are wagered and judged as given.
async fn play_board(
    state: &Arc<AppState>,
    winner: &TeamId,
    wager: i64,
    daily_double_correct: bool,
) -> GameSnapshot {
    let mut last = None;
    for category in 0..3 {
        for clue in 0..5 {
            let at = Coordinate::new(category, clue);
            let opened = expect_snapshot(host(state, ClientMessage::HostOpenClue { at }).await);
            let active = opened.active_clue.expect("clue is open");

            if active.is_daily_double {
                host(state, ClientMessage::HostSetDailyDoubleWager { wager }).await;
                expect_snapshot(
                    host(
                        state,
                        ClientMessage::HostMarkDailyDouble {
                            correct: daily_double_correct,
                        },
                    )
                    .await,
                );
            } else {
                expect_snapshot(
                    host(
                        state,
                        ClientMessage::HostMarkCorrect {
                            team_id: winner.clone(),
                        },
                    )
                    .await,
                );
            }
            last = Some(expect_snapshot(
                host(state, ClientMessage::HostResolveClue).await,
            ));
        }
    }
    last.expect("board had clues")
}

/// End-to-end: author a set, play both boards and the final round, reach the podium
#[tokio::test]
async fn test_full_game_flow() {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(store.clone()));

    let set_id = build_set(&state, true).await;
    let owls = add_team(&state, "Owls").await;
    let foxes = add_team(&state, "Foxes").await;
    let mut board_rx = state.broadcast.subscribe();

    let loaded = expect_snapshot(
        host(
            &state,
            ClientMessage::HostLoadSet {
                set_id: set_id.clone(),
            },
        )
        .await,
    );
    assert_eq!(loaded.phase, GamePhase::Round1);
    assert_eq!(loaded.categories, vec!["RIVERS", "POETS", "PLANETS"]);
    assert_eq!(loaded.selected_team, Some(owls.clone()));
    assert_eq!(loaded.daily_doubles, vec![Coordinate::new(1, 2)]);

    // The board sees the same snapshot by broadcast
    let mut saw_game = false;
    while let Ok(msg) = board_rx.try_recv() {
        saw_game |= matches!(msg, ServerMessage::GameState { .. });
    }
    assert!(saw_game);

    // Round one: Owls sweep, and win 500 on the daily double
    let after_one = play_board(&state, &owls, 500, true).await;
    assert_eq!(after_one.phase, GamePhase::Round2);
    assert_eq!(after_one.teams[0].score, 8_900);
    assert_eq!(after_one.teams[1].score, 0);
    assert_eq!(after_one.step, 15);
    assert_eq!(after_one.solved, 15);
    assert_eq!(after_one.point_values, [400, 800, 1200, 1600, 2000]);
    // Trailing team picks first in the new round
    assert_eq!(after_one.selected_team, Some(foxes.clone()));

    // Round two: Foxes sweep but miss both daily doubles
    let after_two = play_board(&state, &foxes, 1_000, false).await;
    assert_eq!(after_two.phase, GamePhase::FinalRound);
    assert_eq!(after_two.final_stage, Some(FinalRoundStage::MakeWager));
    assert_eq!(after_two.teams[0].score, 8_900);
    assert_eq!(after_two.teams[1].score, 12_400);
    assert_eq!(after_two.solved, 28);
    assert_eq!(after_two.final_category.as_deref(), Some("CAPITALS"));
    assert_eq!(after_two.final_clue, None);
    assert!(!after_two.teams[1].has_lock);
    // Owls now trail
    assert_eq!(after_two.selected_team, Some(owls.clone()));

    // Final round wagers must all validate
    for (team, wager) in [(&owls, "100"), (&foxes, "20000")] {
        host(
            &state,
            ClientMessage::HostSetFinalWager {
                team_id: team.clone(),
                wager: wager.to_string(),
            },
        )
        .await;
    }
    expect_error(
        host(&state, ClientMessage::HostAdvanceFinalStage).await,
        "INVALID_WAGER",
    );
    host(
        &state,
        ClientMessage::HostSetFinalWager {
            team_id: foxes.clone(),
            wager: "5000".to_string(),
        },
    )
    .await;
    let answering = expect_snapshot(host(&state, ClientMessage::HostAdvanceFinalStage).await);
    assert_eq!(answering.final_stage, Some(FinalRoundStage::SubmitAnswer));
    assert!(answering.final_clue.is_some());
    assert_eq!(answering.final_response, None);

    for team in [&owls, &foxes] {
        expect_snapshot(
            host(
                &state,
                ClientMessage::HostSubmitFinalAnswer {
                    team_id: team.clone(),
                    answer: "What is Accra?".to_string(),
                },
            )
            .await,
        );
    }
    let revealing = expect_snapshot(host(&state, ClientMessage::HostAdvanceFinalStage).await);
    assert_eq!(revealing.final_response.as_deref(), Some("What is Accra?"));

    host(
        &state,
        ClientMessage::HostMarkFinal {
            team_id: owls.clone(),
            correct: true,
        },
    )
    .await;
    // A double tap on the Foxes' miss undoes it, a third applies it again
    let mut last = None;
    for _ in 0..3 {
        last = Some(expect_snapshot(
            host(
                &state,
                ClientMessage::HostMarkFinal {
                    team_id: foxes.clone(),
                    correct: false,
                },
            )
            .await,
        ));
    }
    let judged = last.unwrap();
    assert_eq!(judged.teams[0].score, 9_000);
    assert_eq!(judged.teams[1].score, 7_400);

    let podium = expect_snapshot(host(&state, ClientMessage::HostAdvanceFinalStage).await);
    assert_eq!(podium.final_stage, Some(FinalRoundStage::Podium));
    assert_eq!(
        podium.podium,
        vec![(Placing::First, owls.clone()), (Placing::Second, foxes.clone())]
    );
    expect_error(
        host(&state, ClientMessage::HostAdvanceFinalStage).await,
        "ILLEGAL_TRANSITION",
    );

    // The finished game is recorded in the background
    let record = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(record) = store.games().await.into_iter().next() {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("game record saved");
    assert_eq!(record.set_id, set_id);
    assert_eq!(record.steps, 31);
    assert_eq!(record.history[&owls].last(), Some(&9_000));
    assert_eq!(record.history[&foxes].len(), 32);
}

/// A one-board set goes straight from round one to the final round
#[tokio::test]
async fn test_single_round_set() {
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())));
    let set_id = build_set(&state, false).await;
    let owls = add_team(&state, "Owls").await;

    host(&state, ClientMessage::HostLoadSet { set_id }).await;
    let done = play_board(&state, &owls, 0, true).await;
    assert_eq!(done.phase, GamePhase::FinalRound);
    // A lone team always has the lock
    assert!(done.teams[0].has_lock);
}

#[tokio::test]
async fn test_clue_rules() {
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())));
    let set_id = build_set(&state, true).await;
    let owls = add_team(&state, "Owls").await;
    let foxes = add_team(&state, "Foxes").await;
    host(&state, ClientMessage::HostLoadSet { set_id }).await;

    // Can't skip ahead while the board has clues
    expect_error(
        host(&state, ClientMessage::HostAdvancePhase).await,
        "ILLEGAL_TRANSITION",
    );

    let at = Coordinate::new(0, 1);
    host(&state, ClientMessage::HostOpenClue { at }).await;
    expect_error(
        host(
            &state,
            ClientMessage::HostOpenClue {
                at: Coordinate::new(0, 2),
            },
        )
        .await,
        "ILLEGAL_TRANSITION",
    );

    // Owls wrong, then Foxes right, then credit moves to Owls
    host(
        &state,
        ClientMessage::HostMarkIncorrect {
            team_id: owls.clone(),
        },
    )
    .await;
    let snapshot = expect_snapshot(
        host(
            &state,
            ClientMessage::HostMarkCorrect {
                team_id: foxes.clone(),
            },
        )
        .await,
    );
    assert_eq!(snapshot.teams[0].score, -400);
    assert_eq!(snapshot.teams[1].score, 400);

    let snapshot = expect_snapshot(
        host(
            &state,
            ClientMessage::HostMarkCorrect {
                team_id: owls.clone(),
            },
        )
        .await,
    );
    assert_eq!(snapshot.teams[0].score, 400);
    assert_eq!(snapshot.teams[1].score, 0);

    let resolved = expect_snapshot(host(&state, ClientMessage::HostResolveClue).await);
    assert_eq!(resolved.selected_team, Some(owls.clone()));
    expect_error(
        host(&state, ClientMessage::HostOpenClue { at }).await,
        "ILLEGAL_TRANSITION",
    );

    // Manual adjustments and unknown teams
    let adjusted = expect_snapshot(
        host(
            &state,
            ClientMessage::HostEditScore {
                team_id: foxes.clone(),
                delta: -250,
            },
        )
        .await,
    );
    assert_eq!(adjusted.teams[1].score, -250);
    expect_error(
        host(
            &state,
            ClientMessage::HostEditScore {
                team_id: "nobody".to_string(),
                delta: 1,
            },
        )
        .await,
        "UNKNOWN_TEAM",
    );
}

#[tokio::test]
async fn test_unauthorized_host_commands() {
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())));
    let set_id = build_set(&state, true).await;
    add_team(&state, "Owls").await;

    let attempts = [
        ClientMessage::HostLoadSet {
            set_id: set_id.clone(),
        },
        ClientMessage::HostAddTeam {
            name: "Crashers".to_string(),
            members: vec![],
            color: "black".to_string(),
        },
        ClientMessage::HostResetGame,
        ClientMessage::BuildNew,
        ClientMessage::BuildEdit { set_id },
    ];
    for msg in attempts {
        let reply = handle_message(msg, &Role::Board, &state).await;
        match reply {
            Some(ServerMessage::Error { code, msg }) => {
                assert_eq!(code, "UNAUTHORIZED");
                assert!(msg.starts_with("Only host can"));
            }
            other => panic!("Expected UNAUTHORIZED, got {:?}", other),
        }
    }
    assert!(state.get_snapshot().await.is_none());
    assert_eq!(state.get_roster().await.len(), 1);

    // Reading is fine
    let reply = handle_message(ClientMessage::ListSets, &Role::Board, &state).await;
    assert!(matches!(reply, Some(ServerMessage::Sets { sets }) if sets.len() == 1));
}

#[tokio::test]
async fn test_daily_puzzle_on_the_board() {
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new())));
    let started = host(
        &state,
        ClientMessage::HostStartPuzzle {
            clue: "Keeps the doctor away".to_string(),
            answer: "apple".to_string(),
        },
    )
    .await;
    assert!(matches!(started, ServerMessage::Puzzle { ref puzzle } if puzzle.length == 5));

    let mut rx = state.broadcast.subscribe();
    for letter in "apple".chars() {
        let reply = handle_message(ClientMessage::PuzzleLetter { letter }, &Role::Board, &state).await;
        assert!(reply.is_none());
    }
    handle_message(ClientMessage::PuzzleEnter, &Role::Board, &state).await;

    let mut last = None;
    while let Ok(msg) = rx.try_recv() {
        if let ServerMessage::Puzzle { puzzle } = msg {
            last = Some(puzzle);
        }
    }
    let view = last.expect("puzzle broadcast");
    assert_eq!(view.answer.as_deref(), Some("APPLE"));
    assert!(view.score.is_some());
}
