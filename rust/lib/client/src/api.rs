//! HTTP transport: auth endpoints plus typed CRUD per resource.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::model::{Credentials, Id, LoginResponse, Registration};
use crate::resource::Resource;
use crate::token::TokenSource;

/// Shared transport. Cheap to clone; clones share the connection pool and
/// the token source.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource<T: Resource>(&self) -> ResourceClient<T> {
        ResourceClient {
            api: self.clone(),
            _phantom: PhantomData,
        }
    }

    /// `POST /login` — anonymous.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        resp.json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::Decode(format!("login response: {}", e)))
    }

    /// `POST /registrar` — anonymous.
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/registrar"))
            .json(registration)
            .send()
            .await?;
        Self::check(resp).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn send_authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = self.authed(builder).await?.send().await?;
        Self::check(resp).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        debug!(path, "GET");
        let resp = self.send_authed(self.http.get(self.url(path))).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        debug!(path, "POST");
        self.send_authed(self.http.post(self.url(path)).json(body))
            .await
            .map(|_| ())
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        debug!(path, "PUT");
        self.send_authed(self.http.put(self.url(path)).json(body))
            .await
            .map(|_| ())
    }

    async fn delete_path(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        self.send_authed(self.http.delete(self.url(path)))
            .await
            .map(|_| ())
    }
}

/// Typed CRUD client for one resource.
///
/// Every call carries the bearer token when the token source has one.
pub struct ResourceClient<T: Resource> {
    api: ApiClient,
    _phantom: PhantomData<T>,
}

impl<T: Resource> ResourceClient<T> {
    /// Fetch the full collection.
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        let routes = T::ROUTES;
        let body: Value = self.api.get_json(routes.list).await?;
        let items = match routes.envelope {
            Some(key) => body
                .get(key)
                .cloned()
                .ok_or_else(|| ApiError::Decode(format!("{}: missing \"{}\"", routes.list, key)))?,
            None => body,
        };
        serde_json::from_value(items).map_err(|e| ApiError::Decode(format!("{}: {}", routes.list, e)))
    }

    pub async fn create(&self, input: &T::Input) -> Result<(), ApiError> {
        self.api.post_json(T::ROUTES.create, input).await
    }

    pub async fn update(&self, id: &Id, input: &T::Input) -> Result<(), ApiError> {
        let path = format!("{}/{}", T::ROUTES.update, id);
        self.api.put_json(&path, input).await
    }

    pub async fn delete(&self, id: &Id) -> Result<(), ApiError> {
        let Some(prefix) = T::ROUTES.delete else {
            return Err(ApiError::Unsupported(format!("{} cannot be deleted", T::NAME)));
        };
        let path = format!("{}/{}", prefix, id);
        self.api.delete_path(&path).await
    }
}

impl<T: Resource> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        self.api.resource()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{delete, get, post, put};
    use serde_json::json;

    use super::*;
    use crate::model::{Breed, BreedInput, Dog};
    use crate::token::{NoAuth, SharedToken, StaticToken};

    const TOKEN: &str = "tok-123";

    #[derive(Clone, Default)]
    struct Seen {
        auth: Arc<Mutex<Vec<Option<String>>>>,
        bodies: Arc<Mutex<Vec<Value>>>,
    }

    impl Seen {
        fn record(&self, headers: &HeaderMap) -> bool {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let ok = auth.as_deref() == Some(&format!("Bearer {}", TOKEN));
            self.auth.lock().unwrap().push(auth);
            ok
        }
    }

    fn denied() -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token inválido"}))).into_response()
    }

    async fn start(seen: Seen) -> String {
        let app = Router::new()
            .route(
                "/api/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "secreto123" {
                        Json(json!({"token": TOKEN, "user": {"nombre": "Ana"}})).into_response()
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Credenciales inválidas"})))
                            .into_response()
                    }
                }),
            )
            .route(
                "/api/registrar",
                post(|| async {
                    (StatusCode::BAD_REQUEST, Json(json!({"email": ["Este correo ya está registrado."]})))
                }),
            )
            .route(
                "/api/perros",
                get(|State(seen): State<Seen>, headers: HeaderMap| async move {
                    if !seen.record(&headers) {
                        return denied();
                    }
                    Json(json!({"perros": [
                        {"id": 1, "nombre": "Firulais", "peso": "10.5", "raza": {"id": 2, "nombre": "Labrador"}}
                    ]}))
                    .into_response()
                }),
            )
            .route(
                "/api/razas",
                get(|State(seen): State<Seen>, headers: HeaderMap| async move {
                    seen.record(&headers);
                    Json(json!([{"id": 2, "nombre": "Labrador"}, {"id": 3, "nombre": "Beagle"}]))
                }),
            )
            .route(
                "/api/crearRaza",
                post(|State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    if !seen.record(&headers) {
                        return denied();
                    }
                    seen.bodies.lock().unwrap().push(body);
                    (StatusCode::CREATED, Json(json!({"ok": true}))).into_response()
                }),
            )
            .route(
                "/api/actualizarRaza/{id}",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    if id == "404" {
                        return (StatusCode::NOT_FOUND, "").into_response();
                    }
                    Json(json!({"id": id, "nombre": body["nombre"]})).into_response()
                }),
            )
            .route(
                "/api/eliminarPerro/{id}",
                delete(|Path(id): Path<u64>| async move {
                    if id == 1 {
                        StatusCode::NO_CONTENT.into_response()
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"message": "Perro no encontrado"}))).into_response()
                    }
                }),
            )
            .with_state(seen);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    #[tokio::test]
    async fn login_returns_token_and_profile() {
        let base = start(Seen::default()).await;
        let api = ApiClient::new(&base, Arc::new(NoAuth));
        assert!(!api.base_url().ends_with('/'));

        let resp = api.login(&Credentials::new("ana@dpav.mx", "secreto123")).await.unwrap();
        assert_eq!(resp.token, TOKEN);
        assert_eq!(resp.user.display_name(), "Ana");

        let err = api.login(&Credentials::new("ana@dpav.mx", "otra-clave")).await.unwrap_err();
        assert!(err.is_auth(), "got {:?}", err);
    }

    #[tokio::test]
    async fn register_surfaces_field_errors() {
        let base = start(Seen::default()).await;
        let api = ApiClient::new(&base, Arc::new(NoAuth));
        let err = api
            .register(&Registration {
                nombre: "Ana".into(),
                apellido_paterno: "Ruiz".into(),
                telefono: "5512345678".into(),
                email: "ana@dpav.mx".into(),
                password: "secreto123".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Este correo ya está registrado."));
    }

    #[tokio::test]
    async fn dog_list_unwraps_envelope_and_sends_bearer() {
        let seen = Seen::default();
        let base = start(seen.clone()).await;
        let api = ApiClient::new(&base, Arc::new(StaticToken::new(TOKEN)));

        let dogs = api.resource::<Dog>().list().await.unwrap();
        assert_eq!(dogs.len(), 1);
        assert_eq!(dogs[0].peso, 10.5);
        assert_eq!(dogs[0].breed_name(&[]), "Labrador");
        assert_eq!(
            seen.auth.lock().unwrap().as_slice(),
            &[Some(format!("Bearer {}", TOKEN))]
        );
    }

    #[tokio::test]
    async fn missing_token_maps_to_unauthorized() {
        let base = start(Seen::default()).await;
        let api = ApiClient::new(&base, Arc::new(SharedToken::new()));
        let err = api.resource::<Dog>().list().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.server_message(), Some("Token inválido"));
    }

    #[tokio::test]
    async fn breed_calls_carry_the_session_token() {
        let seen = Seen::default();
        let base = start(seen.clone()).await;
        let token = SharedToken::new();
        token.set(TOKEN);
        let razas = ApiClient::new(&base, Arc::new(token)).resource::<Breed>();

        let list = razas.list().await.unwrap();
        assert_eq!(list.iter().map(|b| b.nombre.as_str()).collect::<Vec<_>>(), vec!["Labrador", "Beagle"]);

        razas.create(&BreedInput { nombre: "Pug".into() }).await.unwrap();
        assert_eq!(seen.bodies.lock().unwrap()[0]["nombre"], "Pug");
        assert!(seen.auth.lock().unwrap().iter().all(|a| a.as_deref() == Some("Bearer tok-123")));
    }

    #[tokio::test]
    async fn update_and_delete_report_server_failures() {
        let base = start(Seen::default()).await;
        let api = ApiClient::new(&base, Arc::new(StaticToken::new(TOKEN)));

        api.resource::<Breed>()
            .update(&Id::Num(2), &BreedInput { nombre: "Labrador Retriever".into() })
            .await
            .unwrap();
        let err = api
            .resource::<Breed>()
            .update(&Id::Num(404), &BreedInput { nombre: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 404, .. }));

        api.resource::<Dog>().delete(&Id::Num(1)).await.unwrap();
        let err = api.resource::<Dog>().delete(&Id::Num(99)).await.unwrap_err();
        assert_eq!(err.user_message("Error al eliminar el perro"), "Perro no encontrado");
    }

    #[tokio::test]
    async fn breeds_cannot_be_deleted() {
        let api = ApiClient::new("http://127.0.0.1:9", Arc::new(NoAuth));
        let err = api.resource::<Breed>().delete(&Id::Num(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Unsupported(_)));
    }
}
