use crate::api::ResponseOutcome;
use crate::error::Result;
use crate::upload::{UploadFields, UploadWorkflow};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use url::form_urlencoded;

pub const LOADING_TEXT: &str = "Carregando...";
pub const SUM_MISSING_TEXT: &str = "Preencha os dois números.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
}

/// Results posted back from background requests.
pub enum UiMessage {
    Health(Result<ResponseOutcome>),
    Sum(Result<ResponseOutcome>),
    ItemCreated {
        item: Item,
        result: Result<ResponseOutcome>,
    },
    Upload(Result<ResponseOutcome>),
}

#[derive(Debug, Default, Clone)]
pub struct SumForm {
    pub a: String,
    pub b: String,
}

impl SumForm {
    pub fn query_path(&self) -> Option<String> {
        let (a, b) = (self.a.trim(), self.b.trim());
        if a.is_empty() || b.is_empty() {
            return None;
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("a", a)
            .append_pair("b", b)
            .finish();
        Some(format!("/soma?{}", query))
    }
}

#[derive(Debug, Clone)]
pub struct ItemForm {
    pub name: String,
    pub quantity: u32,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: 1,
        }
    }
}

impl ItemForm {
    pub fn to_item(&self) -> Option<Item> {
        if self.name.trim().is_empty() || self.quantity == 0 {
            return None;
        }
        Some(Item {
            name: self.name.clone(),
            quantity: self.quantity,
        })
    }

    pub fn reset(&mut self) {
        *self = ItemForm::default();
    }
}

pub struct AppState {
    pub health: String,
    pub sum_form: SumForm,
    pub sum_result: String,
    pub sum_pending: bool,
    pub item_form: ItemForm,
    pub items: Vec<Item>,
    pub item_pending: bool,
    pub upload_fields: UploadFields,
    pub workflow: UploadWorkflow,
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new(workflow: UploadWorkflow) -> Self {
        Self {
            health: LOADING_TEXT.to_string(),
            sum_form: SumForm::default(),
            sum_result: String::new(),
            sum_pending: false,
            item_form: ItemForm::default(),
            items: Vec::new(),
            item_pending: false,
            upload_fields: UploadFields::default(),
            workflow,
            error_message: None,
        }
    }

    pub fn apply(&mut self, message: UiMessage) {
        match message {
            UiMessage::Health(result) => self.health = health_text(result),
            UiMessage::Sum(result) => {
                self.sum_pending = false;
                self.sum_result = sum_text(result);
            }
            UiMessage::ItemCreated { item, result } => {
                self.item_pending = false;
                match result.and_then(ResponseOutcome::into_result) {
                    Ok(_) => {
                        self.items.push(item);
                        self.item_form.reset();
                    }
                    Err(e) => error!(name = %item.name, error = %e, "item creation failed"),
                }
            }
            UiMessage::Upload(result) => self.workflow.finish_submit(result),
        }
    }
}

pub fn health_text(result: Result<ResponseOutcome>) -> String {
    match result.and_then(ResponseOutcome::into_result) {
        Ok(value) => value.to_string(),
        Err(e) => format!("Erro: {}", e),
    }
}

pub fn sum_text(result: Result<ResponseOutcome>) -> String {
    match result.and_then(ResponseOutcome::into_result) {
        Ok(data) => format!(
            "Resultado: {} (a = {}, b = {})",
            display_value(data.get("resultado")),
            display_value(data.get("a")),
            display_value(data.get("b"))
        ),
        Err(e) => format!("Erro: {}", e),
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}
