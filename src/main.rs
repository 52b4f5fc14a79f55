use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

use ghost_squad::ar::{ArBackend, ArPlacementController};
use ghost_squad::capture::CaptureSession;
use ghost_squad::config::GameTuning;
use ghost_squad::hunt::GameStore;
use ghost_squad::map::MapView;
use ghost_squad::notice::NoticeBoard;
use ghost_squad::orchestrator::GhostSquadPlugin;
use ghost_squad::save::{JsonFileSink, Persistence};
use ghost_squad::shared::*;
use ghost_squad::sim::{step_towards, SceneLog, SimReticle, SimScene};

const DEFAULT_TUNING_PATH: &str = "assets/tuning.ron";
const DEMO_LOCATION: &str = "Firehouse";
const DEMO_CAPTURES: u32 = 3;
/// Walking pace of the simulated player, metres per frame.
const STRIDE_M: f64 = 1.5;

/// Scripted player for the headless demo hunt.
#[derive(Resource, Debug)]
struct DemoWalker {
    position: Option<Coordinate>,
    started: bool,
    /// Capture count at which the demo stops, fixed once saved progress is in.
    goal: Option<u32>,
    last_ranging: String,
}

fn main() {
    let tuning_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_TUNING_PATH.to_string());

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 30.0,
        ))),
        LogPlugin::default(),
        StatesPlugin,
    ));

    let tuning = match GameTuning::load(&tuning_path) {
        Ok(tuning) => {
            info!("Loaded tuning from {}", tuning_path);
            tuning
        }
        Err(e) => {
            warn!("{}; using built-in tuning", e);
            GameTuning::default()
        }
    };

    app.add_plugins(GhostSquadPlugin { tuning, seed: None })
        .insert_resource(Persistence::new(JsonFileSink::beside_executable()))
        .insert_resource(PlayerIdentity {
            uid: String::from("demo-player"),
        })
        .insert_resource(ArBackend::new(
            SimReticle::showing(Transform::from_xyz(0.0, -1.2, -2.0)),
            SimScene::with_all_entities(SceneLog::default()),
        ))
        .insert_resource(DemoWalker {
            position: None,
            started: false,
            goal: None,
            last_ranging: String::new(),
        })
        .add_systems(Update, (drive_demo, report_demo_events))
        .run();
}

fn drive_demo(
    mut walker: ResMut<DemoWalker>,
    phase: Res<State<GamePhase>>,
    store: Res<GameStore>,
    placement: Res<ArPlacementController>,
    session: Res<CaptureSession>,
    map_view: Res<MapView>,
    mut selections: EventWriter<SelectLocationEvent>,
    mut loads: EventWriter<LoadSavedStateEvent>,
    mut positions: EventWriter<PositionUpdateEvent>,
    mut gestures: EventWriter<CaptureGestureEvent>,
    mut scans: EventWriter<QrDecodedEvent>,
    mut exit: EventWriter<AppExit>,
) {
    match phase.get() {
        GamePhase::Loading => {}
        GamePhase::ChoosingLocation => {
            if !walker.started {
                walker.started = true;
                selections.send(SelectLocationEvent {
                    name: DEMO_LOCATION.to_string(),
                });
                loads.send(LoadSavedStateEvent);
            }
        }
        GamePhase::Hunting => {
            let captures = store.stats().captures;
            let goal = *walker.goal.get_or_insert(captures + DEMO_CAPTURES);
            if captures >= goal {
                info!("Demo complete: {:?}", store.stats());
                exit.send(AppExit::Success);
                return;
            }
            if store.is_inventory_full() {
                scans.send(QrDecodedEvent {
                    payload: store.tuning().containment_unit_id.clone(),
                });
                return;
            }
            if session.is_capturing() {
                return;
            }
            if placement.is_placed(PlaceableObject::Ghost) {
                gestures.send(CaptureGestureEvent::Hold);
                return;
            }

            let Some(ghost) = store.active_ghost() else {
                return;
            };
            let start = walker.position.unwrap_or_else(|| {
                // Start a block away from the hunting area.
                store
                    .selected_location()
                    .map(|l| l.center.offset(-0.0008, 0.0008))
                    .unwrap_or(ghost.position)
            });
            let next = step_towards(start, ghost.position, STRIDE_M);
            walker.position = Some(next);
            positions.send(PositionUpdateEvent {
                coord: next,
                accuracy_m: Some(5.0),
            });

            let ranging = map_view.ranging_label();
            if ranging != walker.last_ranging {
                debug!("{}", ranging);
                walker.last_ranging = ranging;
            }
        }
    }
}

fn report_demo_events(
    mut placed: EventReader<ObjectPlacedEvent>,
    mut captured: EventReader<CaptureSucceededEvent>,
    mut deposited: EventReader<DepositCompletedEvent>,
    mut unlocked: EventReader<Ecto1UnlockedEvent>,
    mut board: ResMut<NoticeBoard>,
) {
    for notice in board.drain_transient() {
        info!("Notice: {}", notice);
    }
    for ev in placed.read() {
        info!("{:?} appeared in the camera view", ev.object);
    }
    for ev in captured.read() {
        info!(
            "Trapped a {} ghost: {} points, level {}",
            ev.item.kind.label(),
            ev.stats.points,
            ev.stats.level
        );
    }
    for ev in deposited.read() {
        info!("Deposited {} ghosts worth {} points", ev.items, ev.points_value);
    }
    for _ in unlocked.read() {
        info!("ECTO-1 is waiting near the hunting area");
    }
}
