use crate::domain::model::Student;
use crate::domain::ports::StudentDirectory;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    codigo: &'a str,
}

/// Directory response; any extra field is ignored.
#[derive(Debug, Deserialize)]
struct StudentRecord {
    nombre: String,
    #[serde(default)]
    grado: Option<String>,
    #[serde(default)]
    tipo_alimentacion: Option<String>,
}

impl From<StudentRecord> for Student {
    fn from(record: StudentRecord) -> Self {
        Student::new(
            record.nombre,
            record.grado.unwrap_or_default(),
            record.tipo_alimentacion.unwrap_or_default(),
        )
    }
}

/// Student directory reached over HTTP (`POST {codigo}`).
#[derive(Debug, Clone)]
pub struct HttpStudentDirectory {
    client: Client,
    endpoint: String,
}

impl HttpStudentDirectory {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl StudentDirectory for HttpStudentDirectory {
    async fn lookup(&self, code: &str) -> Result<Option<Student>> {
        tracing::debug!("Looking up student code at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&LookupRequest { codigo: code })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Directory response status: {}", status);

        if status.is_success() {
            let record: StudentRecord = response.json().await?;
            return Ok(Some(record.into()));
        }

        // 找不到或代碼無效
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Ok(None);
        }

        Err(ServiceError::GatewayStatus {
            status: status.as_u16(),
        })
    }
}
