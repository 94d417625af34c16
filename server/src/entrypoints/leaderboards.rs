use std::sync::Arc;

use lockedin_server::{board::Board, render};
use rocket::{request::FromParam, response::status::Accepted, serde::json::Json, State};
use shared::Period;

use super::types::{LeaderboardResponse, PassResponse};

pub struct PeriodParam(Period);

impl<'a> FromParam<'a> for PeriodParam {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse().map(PeriodParam).map_err(|_| param)
    }
}

#[get("/")]
async fn get_leaderboard(board: &State<Arc<Board>>) -> Json<LeaderboardResponse> {
    Json(board.snapshot().await.into())
}

#[get("/table")]
async fn get_table(board: &State<Arc<Board>>) -> String {
    render::render(&board.snapshot().await)
}

#[put("/period/<period>")]
async fn put_period(
    board: &State<Arc<Board>>,
    period: PeriodParam,
) -> Accepted<Json<PassResponse>> {
    let token = board.select_period(period.0).await;
    Accepted(Json(token.into()))
}

#[post("/refresh")]
async fn post_refresh(board: &State<Arc<Board>>) -> Accepted<Json<PassResponse>> {
    let token = board.refresh().await;
    Accepted(Json(token.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing leaderboard entrypoints", |rocket| async {
        rocket.mount(
            "/leaderboard",
            rocket::routes![get_leaderboard, get_table, put_period, post_refresh],
        )
    })
}
