use rocket::fairing::AdHoc;

pub mod leaderboards;
pub mod metrics;
pub mod types;

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .attach(leaderboards::stage())
            .attach(metrics::stage())
    })
}
