//! REST API endpoint handlers for the fleet server.
//!
//! Read handlers serve snapshots of the in-memory registry via the shared
//! [`AppState`]; command handlers delegate to [`crate::dispatch`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/robots` | List all known robots |
//! | `GET` | `/api/robots/:robot_id` | Get single robot record |
//! | `POST` | `/api/tasks` | Dispatch a task to a robot |
//! | `POST` | `/api/robots/:robot_id/cancel` | Cancel a robot's task |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use flotilla_types::{RobotId, TaskRequest};

use crate::dispatch;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing fleet status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (robot_count, online_count) = {
        let registry = state.registry.read().await;
        let records = registry.list_all();
        let online = records.iter().filter(|r| r.is_online()).count();
        (records.len(), online)
    };
    let observer_count = state.feed_tx.receiver_count();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Flotilla Fleet Server</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .verb {{ color: #7ee787; font-weight: bold; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Flotilla Fleet Server</h1>
    <p class="subtitle">Fleet state synchronization and command dispatch</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div>
        <div class="metric">
            <div class="label">Robots</div>
            <div class="value">{robot_count}</div>
        </div>
        <div class="metric">
            <div class="label">Online</div>
            <div class="value">{online_count}</div>
        </div>
        <div class="metric">
            <div class="label">Feed observers</div>
            <div class="value">{observer_count}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><span class="verb">GET</span> <a href="/api/robots">/api/robots</a> -- List all known robots</li>
        <li><span class="verb">GET</span> /api/robots/:robot_id -- Single robot record</li>
        <li><span class="verb">POST</span> /api/tasks -- Dispatch a task</li>
        <li><span class="verb">POST</span> /api/robots/:robot_id/cancel -- Cancel a robot's task</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws</code> -- Live state update feed</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/robots -- list robots
// ---------------------------------------------------------------------------

/// List every robot ever seen, with its last-known state.
pub async fn list_robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = {
        let registry = state.registry.read().await;
        registry.list_all()
    };
    Json(records)
}

// ---------------------------------------------------------------------------
// GET /api/robots/:robot_id -- single robot
// ---------------------------------------------------------------------------

/// Return one robot's record, or 404 if it has never reported.
pub async fn get_robot(
    State(state): State<Arc<AppState>>,
    Path(robot_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let robot_id = RobotId::from(robot_id);
    let record = {
        let registry = state.registry.read().await;
        registry.get(&robot_id).cloned()
    };

    record.map(Json).ok_or_else(|| {
        ApiError::NotFound(format!("robot {robot_id} is not registered"))
    })
}

// ---------------------------------------------------------------------------
// POST /api/tasks -- dispatch a task
// ---------------------------------------------------------------------------

/// Dispatch a task to the requested robot.
///
/// Returns the scheduled task id, or 503 with a reason when the robot is
/// unknown, offline, or low on battery.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = dispatch::dispatch_task(&state, request).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// POST /api/robots/:robot_id/cancel -- cancel a task
// ---------------------------------------------------------------------------

/// Cancel whatever the robot is doing, if the robot is known.
pub async fn cancel_task(
    State(state): State<Arc<AppState>>,
    Path(robot_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let response = dispatch::cancel_task(&state, RobotId::from(robot_id)).await?;
    Ok(Json(response))
}
