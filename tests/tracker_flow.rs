use chrono::NaiveDate;
use orbit::app::App;
use orbit::grid::{CellKind, GridMode};
use orbit::model::ChunkState;
use orbit::storage::{load_streak, StoreLocation};
use std::cell::Cell;
use std::rc::Rc;
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).expect("valid date")
}

#[test]
fn streak_follows_calendar_days_across_sessions() {
    let temp = tempdir().expect("tempdir");
    let location = StoreLocation::explicit(temp.path());
    let now = Rc::new(Cell::new(day(1)));

    let clock = {
        let now = Rc::clone(&now);
        move || now.get()
    };
    let mut app = App::load_with_clock(location.clone(), Box::new(clock.clone()))
        .expect("load app");
    app.create_task("Stretch", 30, Some(7)).expect("create");
    app.toggle_item(0).expect("toggle");
    app.toggle_item(1).expect("toggle");
    assert_eq!(app.streak().count, 1);

    now.set(day(2));
    let mut app = App::load_with_clock(location.clone(), Box::new(clock.clone()))
        .expect("reload");
    assert_eq!(app.streak().count, 1);
    app.toggle_item(2).expect("toggle");
    assert_eq!(app.streak().count, 2);

    now.set(day(5));
    let app = App::load_with_clock(location.clone(), Box::new(clock)).expect("reload");
    assert_eq!(app.streak().count, 0);
    assert_eq!(load_streak(&location).expect("streak").count, 0);
}

#[test]
fn grouped_navigation_reflects_progress() {
    let temp = tempdir().expect("tempdir");
    let location = StoreLocation::explicit(temp.path());
    let mut app = App::load_with_clock(location, Box::new(|| day(10))).expect("load app");
    app.create_task("Pages", 10, Some(3)).expect("create");

    app.tap(0).expect("zoom first chunk");
    for position in 0..3 {
        app.tap(position).expect("toggle");
    }
    app.back();

    let view = app.view();
    assert_eq!(view.mode, GridMode::Overview);
    assert_eq!(
        view.cells[0].kind,
        CellKind::Chunk {
            index: 0,
            state: ChunkState::Full
        }
    );
    assert_eq!(app.stats().percent_label, "30%");
    assert_eq!(app.stats().streak, 1);
}
