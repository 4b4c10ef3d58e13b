//! Client tests against a minimal in-process HTTP backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use vol_client::{ApiClient, ApiError, PhotoUpload, Settings};
use vol_core::{
    BatchOptions, DEFAULT_PLACEHOLDER_COMMENT, HabitsEdit, Slot, StudyEdit, VolunteerEdit,
    VolunteerPool, allocate, submit_plan,
};
use vol_model::{AppointmentKey, RdvStatus};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    headers: String,
    body: String,
}

type Handler = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

struct Stub {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

async fn stub(handler: Arc<Handler>) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                log.lock().unwrap().push(request.clone());
                let (status, body) = handler(&request);
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    Stub { base_url, requests }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Recorded> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
    let mut request_line = head.lines().next()?.split_whitespace();
    Some(Recorded {
        method: request_line.next()?.to_string(),
        path: request_line.next()?.to_string(),
        headers: head.to_lowercase(),
        body: String::from_utf8_lossy(&buffer[header_end..]).to_string(),
    })
}

fn client(base_url: &str, token: Option<&str>) -> ApiClient {
    let settings = Settings::default().with_api_url(Some(base_url.to_string()));
    ApiClient::new(&settings, token).unwrap()
}

#[tokio::test]
async fn sends_bearer_token_and_parses_lists() {
    let stub = stub(Arc::new(|request: &Recorded| match request.path.as_str() {
        "/api/volontaires" => (
            200,
            json!([{"idVol": 1, "nom": "Durand", "prenom": "Léa"}]).to_string(),
        ),
        "/api/etudes" => (200, json!([{"idEtude": 4, "ref": "E4"}]).to_string()),
        _ => (404, String::new()),
    }))
    .await;
    let api = client(&stub.base_url, Some("secret-token"));

    let data = api.reference_data().await.unwrap();
    assert_eq!(data.volunteers.len(), 1);
    assert_eq!(data.studies[0].reference, "E4");

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(
        requests
            .iter()
            .all(|r| r.headers.contains("authorization: bearer secret-token"))
    );
}

#[tokio::test]
async fn unauthorized_maps_to_login_error() {
    let stub = stub(Arc::new(|_: &Recorded| (401, "{}".to_string()))).await;
    let err = client(&stub.base_url, None).list_studies().await.unwrap_err();
    assert!(err.is_auth());
    assert!(err.user_message().contains("login"));
}

#[tokio::test]
async fn missing_habits_is_not_an_error() {
    let stub = stub(Arc::new(|request: &Recorded| match request.path.as_str() {
        "/api/volontaires/7" => (200, json!({"idVol": 7, "nom": "Roux"}).to_string()),
        "/api/volontaires-hc/7" => (404, String::new()),
        "/api/rdvs/volontaire/7" => (200, "[]".to_string()),
        _ => (500, "unexpected".to_string()),
    }))
    .await;
    let api = client(&stub.base_url, Some("t"));

    assert!(api.get_habits(7).await.unwrap().is_none());
    let detail = api.volunteer_detail(7).await.unwrap();
    assert_eq!(detail.habits, vol_core::HabitsState::Missing);

    let err = api.get_study(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 500, .. }));
}

#[tokio::test]
async fn status_update_uses_composite_path() {
    let stub = stub(Arc::new(|_: &Recorded| (204, String::new()))).await;
    let api = client(&stub.base_url, Some("t"));
    let key = AppointmentKey {
        study_id: 12,
        appointment_id: 40,
    };
    api.set_appointment_status(key, RdvStatus::Confirmed)
        .await
        .unwrap();

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/api/rdvs/12/40/status");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, json!({"etat": "CONFIRME"}));
}

#[tokio::test]
async fn photo_upload_is_multipart() {
    let stub = stub(Arc::new(|_: &Recorded| {
        (
            201,
            json!({"idPhoto": 3, "idVol": 5, "nomFichier": "face.png"}).to_string(),
        )
    }))
    .await;
    let api = client(&stub.base_url, Some("t"));
    let photo = api
        .upload_photo(PhotoUpload {
            volunteer_id: 5,
            file_name: "face.png".to_string(),
            content: vec![0x89, b'P', b'N', b'G'],
            kind: Some("face".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(photo.id_photo, 3);

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests[0].path, "/api/photos/upload");
    assert!(requests[0].headers.contains("multipart/form-data"));
    assert!(requests[0].body.contains("name=\"idVol\""));
    assert!(requests[0].body.contains("name=\"typePhoto\""));
}

#[tokio::test]
async fn bulk_plan_tolerates_a_server_failure() {
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    let stub = stub(Arc::new(move |request: &Recorded| {
        let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
        let draft: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        if draft["idVolontaire"] == json!(3) {
            return (500, "database unavailable".to_string());
        }
        let mut created = draft.clone();
        created["idRdv"] = json!(n);
        (201, created.to_string())
    }))
    .await;
    let api = client(&stub.base_url, Some("t"));

    let slots = vec![Slot {
        date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        volunteer_count: 6,
    }];
    let plan = allocate(&slots, &VolunteerPool::new(vec![1, 2, 3, 4], 2));
    let options = BatchOptions {
        study_id: 8,
        comment: None,
        placeholder_comment: DEFAULT_PLACEHOLDER_COMMENT.to_string(),
    };
    let outcome = submit_plan(&api, &plan, &options).await;

    assert_eq!(counter.load(Ordering::SeqCst), 6);
    assert_eq!(outcome.created_real, 3);
    assert_eq!(outcome.failed_real, 1);
    assert_eq!(outcome.created_placeholders, 2);
    assert!(outcome.failures[0].message.contains("500"));
}

/// Answers GETs with `resource` and echoes the body of any write.
fn echo_writes(resource: serde_json::Value) -> Arc<Handler> {
    Arc::new(move |request: &Recorded| match request.method.as_str() {
        "GET" => (200, resource.to_string()),
        _ => (200, request.body.clone()),
    })
}

#[tokio::test]
async fn volunteer_edit_is_put_back_with_unknown_fields() {
    let stub = stub(echo_writes(json!({
        "idVol": 4,
        "nom": "Martin",
        "prenom": "Claire",
        "email": "c.martin@example.org",
        "santeCompatible": "oui"
    })))
    .await;
    let api = client(&stub.base_url, Some("t"));

    let current = api.get_volunteer(4).await.unwrap();
    let edit = VolunteerEdit {
        prenom: Some("Claire-Anne".to_string()),
        email: Some(String::new()),
        ..VolunteerEdit::default()
    };
    let saved = api
        .update_volunteer(4, &edit.apply(&current).unwrap())
        .await
        .unwrap();
    assert_eq!(saved.prenom, "Claire-Anne");

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].path, "/api/volontaires/4");
    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body["santeCompatible"], "oui");
    assert_eq!(body["nom"], "Martin");
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn study_edit_is_put_to_the_study_path() {
    let stub = stub(echo_writes(json!({
        "idEtude": 2,
        "ref": "E2024-017",
        "titre": "Hydratation",
        "dateDebut": "2024-05-01",
        "dateFin": "2024-05-31",
        "promoteur": "Acme"
    })))
    .await;
    let api = client(&stub.base_url, Some("t"));

    let current = api.get_study(2).await.unwrap();
    let edit = StudyEdit {
        date_fin: NaiveDate::from_ymd_opt(2024, 6, 15),
        nb_sujets: Some(24),
        ..StudyEdit::default()
    };
    api.update_study(2, &edit.apply(&current).unwrap())
        .await
        .unwrap();

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].path, "/api/etudes/2");
    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body["dateFin"], "2024-06-15");
    assert_eq!(body["dateDebut"], "2024-05-01");
    assert_eq!(body["nbSujets"], 24);
    assert_eq!(body["promoteur"], "Acme");
}

#[tokio::test]
async fn first_habits_edit_creates_the_questionnaire() {
    let stub = stub(Arc::new(|request: &Recorded| match request.method.as_str() {
        "GET" => (404, "{}".to_string()),
        _ => (201, request.body.clone()),
    }))
    .await;
    let api = client(&stub.base_url, Some("t"));

    let current = api.get_habits(7).await.unwrap();
    assert!(current.is_none());
    let edit = HabitsEdit {
        set: vec![("cremeJour".to_string(), "oui".to_string())],
        unset: Vec::new(),
    };
    let created = api
        .create_habits(&edit.apply(7, current.as_ref()).unwrap())
        .await
        .unwrap();
    assert_eq!(created.id_vol, 7);

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].path, "/api/volontaires-hc");
    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body, json!({"idVol": 7, "cremeJour": "oui"}));
}

#[tokio::test]
async fn later_habits_edits_update_in_place() {
    let stub = stub(echo_writes(json!({
        "idVol": 5,
        "idHc": 99,
        "cremeJour": "non",
        "serum": "oui"
    })))
    .await;
    let api = client(&stub.base_url, Some("t"));

    let current = api.get_habits(5).await.unwrap();
    let edit = HabitsEdit {
        set: vec![("cremeJour".to_string(), "oui".to_string())],
        unset: vec!["serum".to_string()],
    };
    api.update_habits(&edit.apply(5, current.as_ref()).unwrap())
        .await
        .unwrap();

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].path, "/api/volontaires-hc/5");
    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body["idHc"], 99);
    assert_eq!(body["cremeJour"], "oui");
    assert_eq!(body["serum"], serde_json::Value::Null);
}
