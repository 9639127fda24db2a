//! Remote opponent and training reporter against a local fake service.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use strictly_ultimate::{Coord, GridPos, Mark};
use strictly_ultimate_play::{
    LearningClient, MatchSnapshot, MoveRequest, OpponentKind, PlayConfig, ServiceConfig,
    ServiceErrorKind, SuggestedMove, TrainingRecord, TrainingReporter, TurnController, TurnPhase,
};
use tokio::sync::{mpsc, watch};

/// Serves `router` on an ephemeral local port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake service");
    });
    format!("http://{}", addr)
}

/// Fake whose `/api/move` always answers `body`.
fn answering(body: Value) -> Router {
    Router::new().route(
        "/api/move",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    )
}

fn remote_controller(base_url: &str, timeout_ms: u64) -> TurnController {
    let service = ServiceConfig::new(base_url)
        .with_timeout(Duration::from_millis(timeout_ms))
        .with_training(false);
    let client = LearningClient::new(&service).expect("client builds");
    let config = PlayConfig::new(OpponentKind::Remote)
        .with_pacing(Duration::ZERO, Duration::ZERO)
        .with_seed(Some(7))
        .with_service(service);
    TurnController::new(&config, Some(client)).expect("remote has a client")
}

async fn opponent_reply(controller: &TurnController) -> Coord {
    let mut rx = controller.subscribe();
    assert!(controller.submit_move(4, 4).await);
    let snapshot = wait_for(&mut rx, |s| s.game.move_count == 2).await;
    let reply = snapshot.game.last_move.expect("opponent moved");
    assert_eq!(reply.player, Mark::O);
    reply.coord
}

async fn wait_for(
    rx: &mut watch::Receiver<MatchSnapshot>,
    condition: impl FnMut(&MatchSnapshot) -> bool,
) -> MatchSnapshot {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(condition))
        .await
        .expect("condition reached in time")
        .expect("controller alive")
        .clone()
}

fn center() -> GridPos {
    GridPos::new(1, 1).expect("center sub-board")
}

#[tokio::test]
async fn test_uses_service_move() {
    let (tx, mut requests) = mpsc::unbounded_channel::<MoveRequest>();
    let router = Router::new().route(
        "/api/move",
        post(move |Json(request): Json<MoveRequest>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(request);
                Json(json!({ "move": SuggestedMove::from(Coord::new(3, 3).unwrap()) }))
            }
        }),
    );
    let controller = remote_controller(&serve(router).await, 1_000);

    assert_eq!(opponent_reply(&controller).await, Coord::new(3, 3).unwrap());

    let request = requests.recv().await.expect("service was asked");
    assert_eq!(request.current_player, Mark::O);
    assert_eq!(request.last_move, Some([1, 1]));
    assert_eq!(request.main_board[4][4], Some(Mark::X));
    assert_eq!(request.meta_board.len(), 3);
}

#[tokio::test]
async fn test_timeout_falls_back_to_random() {
    let router = Router::new().route(
        "/api/move",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(json!({ "subBoardRow": 1, "subBoardCol": 1, "localRow": 0, "localCol": 0 }))
        }),
    );
    let controller = remote_controller(&serve(router).await, 100);

    let reply = opponent_reply(&controller).await;
    assert_eq!(reply.sub_board(), center());
    assert_ne!(reply, Coord::new(4, 4).unwrap());
}

#[tokio::test]
async fn test_illegal_service_move_falls_back() {
    // (4,4) is the cell X just took.
    let router = answering(json!({
        "subBoardRow": 1, "subBoardCol": 1, "localRow": 1, "localCol": 1
    }));
    let controller = remote_controller(&serve(router).await, 1_000);

    let reply = opponent_reply(&controller).await;
    assert_eq!(reply.sub_board(), center());
    assert_ne!(reply, Coord::new(4, 4).unwrap());
}

#[tokio::test]
async fn test_error_body_falls_back() {
    let router = answering(json!({ "error": "model not loaded" }));
    let controller = remote_controller(&serve(router).await, 1_000);

    assert_eq!(opponent_reply(&controller).await.sub_board(), center());
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let router = Router::new().route(
        "/api/move",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let controller = remote_controller(&serve(router).await, 1_000);

    assert_eq!(opponent_reply(&controller).await.sub_board(), center());
}

#[tokio::test]
async fn test_unreachable_service_falls_back() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let controller = remote_controller(&url, 500);

    assert_eq!(opponent_reply(&controller).await.sub_board(), center());
}

/// Controller with zero pacing whose client points at `base_url`.
fn match_controller(base_url: &str, opponent: OpponentKind) -> TurnController {
    let service = ServiceConfig::new(base_url).with_timeout(Duration::from_millis(1_000));
    let client = LearningClient::new(&service).expect("client builds");
    let config = PlayConfig::new(opponent)
        .with_pacing(Duration::ZERO, Duration::ZERO)
        .with_seed(Some(3))
        .with_service(service);
    TurnController::new(&config, Some(client)).expect("client configured")
}

/// Plays X's first legal cell in row-major order until the match ends.
async fn play_to_end(controller: &TurnController) -> MatchSnapshot {
    let mut rx = controller.subscribe();
    loop {
        let snapshot = wait_for(&mut rx, |s| {
            s.phase == TurnPhase::Terminal || s.phase == TurnPhase::AwaitingMove(Mark::X)
        })
        .await;
        if snapshot.game.is_over() {
            return snapshot;
        }
        let mut played = false;
        for c in Coord::all() {
            if controller.try_submit_move(c.row(), c.col()).await.is_ok() {
                played = true;
                break;
            }
        }
        assert!(played, "an unfinished game always has a legal move for X");
    }
}

/// `/api/train` route counting hits and answering `status`.
fn counting_train(hits: Arc<AtomicUsize>, status: StatusCode) -> Router {
    Router::new()
        .route(
            "/api/move",
            post(|| async { Json(json!({ "error": "untrained" })) }),
        )
        .route(
            "/api/train",
            post(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (status, Json(json!({ "status": "success" })))
                }
            }),
        )
}

fn expected_reward(snapshot: &MatchSnapshot) -> f64 {
    match snapshot.game.status.winner() {
        Some(Mark::O) => 1.0,
        Some(Mark::X) => -1.0,
        None => 0.0,
    }
}

#[tokio::test]
async fn test_training_record_sent_at_game_end() {
    let (tx, mut records) = mpsc::unbounded_channel::<TrainingRecord>();
    let router = Router::new()
        .route(
            "/api/move",
            post(|| async { Json(json!({ "error": "untrained" })) }),
        )
        .route(
            "/api/train",
            post(move |Json(record): Json<TrainingRecord>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(record);
                    Json(json!({ "status": "success" }))
                }
            }),
        );
    let controller = match_controller(&serve(router).await, OpponentKind::Remote);

    let final_snapshot = play_to_end(&controller).await;
    assert_eq!(controller.flush_training().await, Some(true));

    let record = tokio::time::timeout(Duration::from_secs(5), records.recv())
        .await
        .expect("record delivered in time")
        .expect("record received");

    let last = final_snapshot.game.last_move.unwrap();
    assert_eq!(record.state.len(), 93);
    assert_eq!(record.state, record.next_state);
    assert_eq!(record.action, Some(last.coord.quad()));
    assert_eq!(record.reward, expected_reward(&final_snapshot));
}

#[tokio::test]
async fn test_training_failure_keeps_result() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = counting_train(hits.clone(), StatusCode::INTERNAL_SERVER_ERROR);
    let controller = match_controller(&serve(router).await, OpponentKind::Remote);

    let final_snapshot = play_to_end(&controller).await;
    assert_eq!(controller.flush_training().await, Some(false));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let after = controller.snapshot();
    assert_eq!(after.phase, TurnPhase::Terminal);
    assert_eq!(after.game.status, final_snapshot.game.status);
    assert_eq!(after.game.move_count, final_snapshot.game.move_count);
    assert!(after.game.is_over());
}

#[tokio::test]
async fn test_reporter_returns_false_when_service_down() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let service = ServiceConfig::new(url).with_timeout(Duration::from_millis(500));
    let client = LearningClient::new(&service).unwrap();

    let record = TrainingRecord {
        state: "-".repeat(93),
        action: Some([1, 1, 1, 1]),
        reward: -1.0,
        next_state: "-".repeat(93),
        next_valid_actions: Vec::new(),
    };
    assert!(!TrainingReporter::new(client).report(record).await);
}

#[tokio::test]
async fn test_random_opponent_sends_no_training() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = counting_train(hits.clone(), StatusCode::OK);
    let controller = match_controller(&serve(router).await, OpponentKind::Random);

    let final_snapshot = play_to_end(&controller).await;
    assert!(final_snapshot.game.is_over());
    assert_eq!(controller.flush_training().await, None);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_restart_waits_for_training_report() {
    let hits = Arc::new(AtomicUsize::new(0));
    let slow = hits.clone();
    let router = Router::new()
        .route(
            "/api/move",
            post(|| async { Json(json!({ "error": "untrained" })) }),
        )
        .route(
            "/api/train",
            post(move || {
                let hits = slow.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "status": "success" }))
                }
            }),
        );
    let controller = match_controller(&serve(router).await, OpponentKind::Remote);

    play_to_end(&controller).await;
    controller.restart().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(controller.snapshot().game.move_count, 0);
    assert_eq!(controller.flush_training().await, None);
}

#[tokio::test]
async fn test_metrics_query() {
    let router = Router::new().route(
        "/api/metrics",
        get(|| async {
            Json(json!({
                "totalGames": 40, "winRate": 0.55, "totalStates": 1234,
                "explorationRate": 0.1, "wins": 22, "losses": 15, "draws": 3
            }))
        }),
    );
    let client = LearningClient::new(&ServiceConfig::new(serve(router).await)).unwrap();

    let metrics = client.metrics().await.expect("metrics");
    assert_eq!(metrics.total_games, 40);
    assert_eq!(metrics.total_states, 1234);
    assert_eq!(metrics.draws, Some(3));
    assert!(metrics.to_string().contains("55.0%"));
}

#[tokio::test]
async fn test_metrics_error_status() {
    let router = Router::new().route(
        "/api/metrics",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let client = LearningClient::new(&ServiceConfig::new(serve(router).await)).unwrap();

    let err = client.metrics().await.unwrap_err();
    assert_eq!(err.kind, ServiceErrorKind::Status(503));
}
