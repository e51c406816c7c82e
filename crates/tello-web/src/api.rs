use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use tello_course::{Course, CourseSnapshot};
use tello_drone::{Actuator, DroneManager};
use tello_proto::{parse_course_id, parse_speed, ApiError, ApiResult, ManualCommand};

use crate::AppContext;

/// Request values. Browsers post them as a form; scripts tend to use the
/// query string. Form values win, like a classic form handler.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    pub command: Option<String>,
    pub speed: Option<String>,
    pub id: Option<String>,
}

impl Params {
    fn merge(form: Option<web::Form<Params>>, query: web::Query<Params>) -> Params {
        let form = form.map(web::Form::into_inner).unwrap_or_default();
        let query = query.into_inner();
        Params {
            command: form.command.or(query.command),
            speed: form.speed.or(query.speed),
            id: form.id.or(query.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseEntry {
    pub id: u32,
    pub course: CourseSnapshot,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/command").to(command))
        .service(web::resource("/api/shake").route(web::get().to(list_courses)))
        .service(web::resource("/api/shake/start").to(start_course))
        .service(web::resource("/api/shake/run").to(run_course))
        .service(web::resource("/api/shake/stop").to(stop_course))
        .service(web::resource("/api/drone").route(web::get().to(drone_status)))
        .default_service(web::to(not_found));
}

fn respond<T: Serialize>(res: ApiResult<T>) -> HttpResponse {
    let status = StatusCode::from_u16(res.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(res)
}

fn fail(err: ApiError) -> HttpResponse {
    respond(err.into_result())
}

async fn not_found() -> HttpResponse {
    respond(ApiResult::not_found())
}

async fn command(
    ctx: web::Data<AppContext>,
    form: Option<web::Form<Params>>,
    query: web::Query<Params>,
) -> HttpResponse {
    let params = Params::merge(form, query);
    let name = params.command.unwrap_or_default();
    info!(command = %name, "api: command");

    match name.parse::<ManualCommand>() {
        Ok(cmd) => {
            apply_manual(&ctx.drone, cmd, params.speed.as_deref());
            respond(ApiResult::ok("OK"))
        }
        Err(e) => fail(e),
    }
}

/// Manual commands pass straight through; movement uses the current speed.
pub fn apply_manual(drone: &DroneManager, cmd: ManualCommand, speed: Option<&str>) {
    let s = drone.speed();
    match cmd {
        ManualCommand::CeaseRotation => drone.cease_rotation(),
        ManualCommand::TakeOff => drone.take_off(),
        ManualCommand::Land => drone.land(),
        ManualCommand::Hover => drone.hover(),
        ManualCommand::Up => drone.up(s),
        ManualCommand::Down => drone.down(s),
        ManualCommand::Left => drone.left(s),
        ManualCommand::Right => drone.right(s),
        ManualCommand::Forward => drone.forward(s),
        ManualCommand::Backward => drone.backward(s),
        ManualCommand::Clockwise => drone.clockwise(s),
        ManualCommand::CounterClockwise => drone.counter_clockwise(s),
        ManualCommand::Speed => drone.set_speed(parse_speed(speed, drone.default_speed())),
        ManualCommand::FrontFlip => drone.front_flip(),
        ManualCommand::BackFlip => drone.back_flip(),
        ManualCommand::LeftFlip => drone.left_flip(),
        ManualCommand::RightFlip => drone.right_flip(),
        ManualCommand::ThrowTakeOff => drone.throw_take_off(),
        ManualCommand::Bounce => drone.bounce(),
        ManualCommand::Patrol => drone.start_patrol(),
        ManualCommand::StopPatrol => drone.stop_patrol(),
        ManualCommand::FaceDetectTrack => drone.enable_face_detect_tracking(),
        ManualCommand::StopFaceDetectTrack => drone.disable_face_detect_tracking(),
        ManualCommand::Snapshot => drone.take_snapshot(),
    }
}

fn lookup<'a>(ctx: &'a AppContext, params: &Params) -> Result<(u32, &'a Course), ApiError> {
    let id = parse_course_id(params.id.as_deref())?;
    let course = ctx.courses.get(id).ok_or(ApiError::NotFound)?;
    Ok((id, course))
}

async fn start_course(
    ctx: web::Data<AppContext>,
    form: Option<web::Form<Params>>,
    query: web::Query<Params>,
) -> HttpResponse {
    let params = Params::merge(form, query);
    match lookup(&ctx, &params) {
        Ok((id, course)) => {
            course.start();
            info!(course = id, "api: course start");
            respond(ApiResult::ok("started"))
        }
        Err(e) => fail(e),
    }
}

async fn run_course(
    ctx: web::Data<AppContext>,
    form: Option<web::Form<Params>>,
    query: web::Query<Params>,
) -> HttpResponse {
    let params = Params::merge(form, query);
    match lookup(&ctx, &params) {
        Ok((_, course)) => respond(ApiResult::ok(course.run())),
        Err(e) => fail(e),
    }
}

async fn stop_course(
    ctx: web::Data<AppContext>,
    form: Option<web::Form<Params>>,
    query: web::Query<Params>,
) -> HttpResponse {
    let params = Params::merge(form, query);
    match lookup(&ctx, &params) {
        Ok((id, course)) => {
            course.stop();
            info!(course = id, "api: course stop");
            respond(ApiResult::ok(course.snapshot()))
        }
        Err(e) => fail(e),
    }
}

async fn list_courses(ctx: web::Data<AppContext>) -> HttpResponse {
    let courses: Vec<CourseEntry> = ctx
        .courses
        .iter()
        .map(|(id, c)| CourseEntry { id, course: c.snapshot() })
        .collect();
    respond(ApiResult::ok(courses))
}

async fn drone_status(ctx: web::Data<AppContext>) -> HttpResponse {
    respond(ApiResult::ok(ctx.drone.status()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::middleware::{NormalizePath, TrailingSlash};
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tello_drone::DEFAULT_SPEED;

    fn context() -> Arc<AppContext> {
        context_with_speed(DEFAULT_SPEED)
    }

    fn context_with_speed(speed: i32) -> Arc<AppContext> {
        let drone = Arc::new(DroneManager::dry_run(speed, Duration::ZERO));
        Arc::new(AppContext::new(drone))
    }

    macro_rules! app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::from($ctx.clone()))
                    .wrap(NormalizePath::new(TrailingSlash::Trim))
                    .configure(configure),
            )
            .await
        };
    }

    macro_rules! call {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[actix_web::test]
    async fn unknown_command_is_not_found() {
        let ctx = context();
        let app = app!(ctx);
        let (status, body) = call!(app, test::TestRequest::post().uri("/api/command?command=barrelRoll"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"result": "Not found", "code": 404}));
    }

    #[actix_web::test]
    async fn form_command_reaches_the_drone() {
        let ctx = context();
        let app = app!(ctx);
        let req = test::TestRequest::post()
            .uri("/api/command/")
            .set_form([("command", "takeOff")]);
        let (status, body) = call!(app, req);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": "OK", "code": 200}));
        assert_eq!(ctx.drone.status().last_command.as_deref(), Some("takeoff"));
    }

    #[actix_web::test]
    async fn speed_command_and_movement() {
        let ctx = context_with_speed(30);
        let app = app!(ctx);

        call!(app, test::TestRequest::post().uri("/api/command?command=speed&speed=40"));
        assert_eq!(ctx.drone.speed(), 40);
        call!(app, test::TestRequest::get().uri("/api/command?command=forward"));
        assert_eq!(ctx.drone.status().last_command.as_deref(), Some("rc 0 40 0 0"));

        call!(app, test::TestRequest::post().uri("/api/command?command=speed&speed=warp"));
        assert_eq!(ctx.drone.speed(), 30);
        call!(app, test::TestRequest::post().uri("/api/command?command=speed&speed=40"));
        call!(app, test::TestRequest::post().uri("/api/command?command=speed"));
        assert_eq!(ctx.drone.speed(), 30);
    }

    #[actix_web::test]
    async fn shake_start_run_stop() {
        let ctx = context();
        let app = app!(ctx);

        let (_, body) = call!(app, test::TestRequest::post().uri("/api/shake/run?id=1"));
        assert_eq!(body["result"]["is_running"], false);
        assert_eq!(body["result"]["status"], 0);

        let (status, body) = call!(app, test::TestRequest::post().uri("/api/shake/start/?id=1"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "started");

        let (_, body) = call!(app, test::TestRequest::post().uri("/api/shake/run/").set_form([("id", "1")]));
        assert_eq!(body["code"], 200);
        assert_eq!(body["result"]["name"], "Course A");
        assert_eq!(body["result"]["status"], 1);
        assert_eq!(body["result"]["is_running"], true);
        assert!(body["result"]["start_time"].is_string());
        assert_eq!(ctx.drone.status().last_command.as_deref(), Some("takeoff"));

        let (_, body) = call!(app, test::TestRequest::post().uri("/api/shake/stop?id=1"));
        assert_eq!(body["result"]["is_running"], false);
        assert_eq!(body["result"]["status"], 0);
    }

    #[actix_web::test]
    async fn bad_or_unknown_course_id() {
        let ctx = context();
        let app = app!(ctx);

        let (status, body) = call!(app, test::TestRequest::post().uri("/api/shake/start?id=abc"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert!(body["result"].as_str().unwrap().contains("invalid course id"));

        let (status, body) = call!(app, test::TestRequest::post().uri("/api/shake/run?id=9"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["result"], "Not found");
    }

    #[actix_web::test]
    async fn listing_and_drone_status() {
        let ctx = context();
        let app = app!(ctx);

        let (_, body) = call!(app, test::TestRequest::get().uri("/api/shake"));
        let list = body["result"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], 1);
        assert_eq!(list[1]["course"]["name"], "Course B");

        let (status, body) = call!(app, test::TestRequest::get().uri("/api/drone"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["speed"], DEFAULT_SPEED);
        assert_eq!(body["result"]["connected"], false);
    }

    #[actix_web::test]
    async fn unknown_route_gets_envelope() {
        let ctx = context();
        let app = app!(ctx);
        let (status, body) = call!(app, test::TestRequest::get().uri("/api/video"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"result": "Not found", "code": 404}));
    }
}
