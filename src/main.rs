#[macro_use]
extern crate rocket;

use rocket::response::content;
use rocket::serde::json::Json;
use rocket::State;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use country_hangman_server::{
    continent::Continent,
    country::CountryRecord,
    country_source::{load_continent, CountrySource, RestCountriesSource},
    error::LoadError,
    game::{Game, GameState, LoadTicket},
    game_config::GameConfig,
    picker::ThreadRngPicker,
    progress_store::{FileKeyValueStore, KeyValueProgressStore},
};

#[derive(Serialize, Debug)]
struct GameResponse {
    game_state: Option<GameState>,
    error: Option<String>,
}

impl GameResponse {
    fn success(game_state: GameState) -> Self {
        GameResponse {
            game_state: Some(game_state),
            error: None,
        }
    }

    fn error(game_state: GameState, error: String) -> Self {
        GameResponse {
            game_state: Some(game_state),
            error: Some(error),
        }
    }

    fn unavailable() -> Self {
        GameResponse {
            game_state: None,
            error: Some("game worker is not running".to_string()),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
struct SelectContinentData {
    continent: String,
}

#[derive(serde::Deserialize, Clone)]
struct GuessData {
    letter: char,
}

enum Request {
    SelectContinent(SelectContinentData),
    Guess(GuessData),
    NewRound,
    Quit,
    Acknowledge,
    GetGameState,
    ContinentLoaded {
        ticket: LoadTicket,
        result: Result<Vec<CountryRecord>, LoadError>,
    },
    ClearFeedback(u64),
}

struct RequestWithResponse {
    request: Request,
    response_sender: Option<oneshot::Sender<GameResponse>>,
}

struct SharedState {
    sender: mpsc::Sender<RequestWithResponse>,
}

struct WorkerContext {
    sender: mpsc::Sender<RequestWithResponse>,
    source: Arc<dyn CountrySource>,
    config: GameConfig,
}

#[derive(Serialize)]
struct ApiEndpoint {
    path: String,
    method: String,
    description: String,
}

#[get("/")]
fn api_documentation() -> content::RawJson<String> {
    let endpoints = [
        ("/", "GET", "Shows this API documentation"),
        ("/game-state", "GET", "Get the current state of the game"),
        ("/select-continent", "POST", "Pick a continent and load its countries"),
        ("/guess", "POST", "Guess one letter of the current country"),
        ("/new-round", "POST", "Start the next round on the current continent"),
        ("/quit", "POST", "Abandon the round and return to the continent map"),
        ("/acknowledge", "POST", "Dismiss a continent or world conquest"),
    ]
    .into_iter()
    .map(|(path, method, description)| ApiEndpoint {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    })
    .collect::<Vec<_>>();

    content::RawJson(serde_json::to_string_pretty(&endpoints).unwrap_or_default())
}

#[post("/select-continent", data = "<data>")]
async fn select_continent(
    data: Json<SelectContinentData>,
    state: &State<SharedState>,
) -> Json<GameResponse> {
    send_request_and_wait(state, Request::SelectContinent(data.into_inner())).await
}

#[post("/guess", data = "<data>")]
async fn guess(data: Json<GuessData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Guess(data.into_inner())).await
}

#[post("/new-round")]
async fn new_round(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::NewRound).await
}

#[post("/quit")]
async fn quit(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Quit).await
}

#[post("/acknowledge")]
async fn acknowledge(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Acknowledge).await
}

#[get("/game-state")]
async fn game_state(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::GetGameState).await
}

async fn send_request_and_wait(state: &State<SharedState>, request: Request) -> Json<GameResponse> {
    let (response_sender, response_receiver) = oneshot::channel();
    let sent = state
        .sender
        .send(RequestWithResponse {
            request,
            response_sender: Some(response_sender),
        })
        .await;
    if sent.is_err() {
        error!("game worker channel closed");
        return Json(GameResponse::unavailable());
    }

    Json(response_receiver.await.unwrap_or_else(|_| GameResponse::unavailable()))
}

fn respond<E: std::fmt::Display>(game: &Game, result: Result<(), E>) -> GameResponse {
    match result {
        Ok(()) => GameResponse::success(game.get_game_state()),
        Err(e) => GameResponse::error(game.get_game_state(), e.to_string()),
    }
}

fn spawn_continent_load(ctx: &WorkerContext, ticket: LoadTicket) {
    let sender = ctx.sender.clone();
    let source = ctx.source.clone();
    let min_population = ctx.config.min_population;
    tokio::spawn(async move {
        let result = load_continent(source.as_ref(), ticket.continent, min_population).await;
        let request = Request::ContinentLoaded { ticket, result };
        if sender
            .send(RequestWithResponse {
                request,
                response_sender: None,
            })
            .await
            .is_err()
        {
            warn!(continent = %ticket.continent, "worker gone before continent load finished");
        }
    });
}

fn spawn_feedback_timer(ctx: &WorkerContext, id: u64) {
    let sender = ctx.sender.clone();
    let delay = ctx.config.feedback_delay();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if sender
            .send(RequestWithResponse {
                request: Request::ClearFeedback(id),
                response_sender: None,
            })
            .await
            .is_err()
        {
            warn!(id, "worker gone before feedback could be cleared");
        }
    });
}

async fn worker_task(
    mut receiver: mpsc::Receiver<RequestWithResponse>,
    mut game: Game,
    ctx: WorkerContext,
) {
    while let Some(RequestWithResponse {
        request,
        response_sender,
    }) = receiver.recv().await
    {
        let feedback_before = game.feedback_id();
        let response = match request {
            Request::SelectContinent(data) => {
                let result = data
                    .continent
                    .parse::<Continent>()
                    .and_then(|continent| game.select_continent(continent));
                match result {
                    Ok(ticket) => {
                        spawn_continent_load(&ctx, ticket);
                        GameResponse::success(game.get_game_state())
                    }
                    Err(e) => GameResponse::error(game.get_game_state(), e.to_string()),
                }
            }
            Request::Guess(data) => {
                let result = game.guess_letter(data.letter).map(|_| ());
                respond(&game, result)
            }
            Request::NewRound => {
                let result = game.new_round().map(|_| ());
                respond(&game, result)
            }
            Request::Quit => {
                game.quit_to_map();
                GameResponse::success(game.get_game_state())
            }
            Request::Acknowledge => {
                let result = game.acknowledge();
                respond(&game, result)
            }
            Request::GetGameState => GameResponse::success(game.get_game_state()),
            Request::ContinentLoaded { ticket, result } => {
                let result = game.finish_load(ticket, result).map(|_| ());
                respond(&game, result)
            }
            Request::ClearFeedback(id) => {
                game.clear_feedback(id);
                GameResponse::success(game.get_game_state())
            }
        };

        if let Some(id) = game.feedback_id().filter(|id| Some(*id) != feedback_before) {
            spawn_feedback_timer(&ctx, id);
        }
        if let Some(response_sender) = response_sender {
            if response_sender.send(response).is_err() {
                warn!("client went away before the response was sent");
            }
        }
    }
}

#[launch]
async fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GameConfig::load();
    info!(?config, "starting country hangman server");

    let store = KeyValueProgressStore::new(FileKeyValueStore::new(&config.progress_path));
    let game = Game::new(Box::new(store), Box::new(ThreadRngPicker));

    let source: Arc<dyn CountrySource> = Arc::new(
        RestCountriesSource::new(&config.country_api_base, config.request_timeout())
            .expect("Error creating country data client"),
    );

    let (sender, receiver) = mpsc::channel::<RequestWithResponse>(100);
    let ctx = WorkerContext {
        sender: sender.clone(),
        source,
        config,
    };
    tokio::spawn(worker_task(receiver, game, ctx));

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Error creating CORS middleware");

    rocket::build()
        .manage(SharedState { sender })
        .mount(
            "/",
            routes![
                api_documentation,
                select_continent,
                guess,
                new_round,
                quit,
                acknowledge,
                game_state
            ],
        )
        .attach(cors)
}
