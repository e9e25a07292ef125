//! Sample entity types built on the composition layer.

use quill_common::EntityKey;
use quill_compose::{Error, Journaled, Tracked};
use quill_export::{ExportError, Format, Tabular};
use quill_history::HistorySeries;
use quill_journal::{Journal, Level};
use quill_model::{Entity, Schema, SchemaError, Value, guard};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

macro_rules! delegate_entity {
    ($ty:ty) => {
        impl Entity for $ty {
            fn schema(&self) -> &Schema {
                self.inner.schema()
            }

            fn key(&self) -> EntityKey {
                self.inner.key()
            }

            fn value_of(&self, name: &str) -> Option<&Value> {
                self.inner.value_of(name)
            }
        }
    };
}

fn text_of<'a, E: Entity + ?Sized>(entity: &'a E, name: &str) -> &'a str {
    entity.value_of(name).and_then(Value::as_text).unwrap_or("")
}

/// A free-form document. Journaled, not versioned.
#[derive(Debug)]
pub struct Document {
    inner: Journaled,
}

impl Document {
    pub fn schema() -> Result<Arc<Schema>, SchemaError> {
        Schema::builder("Document")
            .text("title")
            .text("content")
            .text("author")
            .required("title")
            .build()
            .map(Arc::new)
    }

    pub fn new(title: &str, content: &str, author: &str) -> Result<Self, Error> {
        let inner = Journaled::builder(Self::schema()?)
            .set("title", title)
            .set("content", content)
            .set("author", author)
            .create(format!("Document '{title}' created by {author}"))?;
        Ok(Self { inner })
    }

    pub fn rename(&mut self, title: &str) -> Result<(), Error> {
        guard::require_non_blank_str("title", title)?;
        let old = text_of(self, "title").to_string();
        self.inner
            .update(format!("Renamed from '{old}' to '{title}'"), |r| {
                r.set("title", title)?;
                Ok(())
            })
    }

    pub fn append(&mut self, text: &str) -> Result<(), Error> {
        let content = format!("{}\n{text}", text_of(self, "content"));
        self.inner.update("Content appended", |r| {
            r.set("content", content)?;
            Ok(())
        })
    }
}

delegate_entity!(Document);
impl Tabular for Document {}

/// A periodic report. Journaled, not versioned.
#[derive(Debug)]
pub struct Report {
    inner: Journaled,
}

impl Report {
    pub fn schema() -> Result<Arc<Schema>, SchemaError> {
        Schema::builder("Report")
            .text("title")
            .text("period")
            .text("status")
            .required("title")
            .required("period")
            .build()
            .map(Arc::new)
    }

    pub fn new(title: &str, period: &str) -> Result<Self, Error> {
        let inner = Journaled::builder(Self::schema()?)
            .set("title", title)
            .set("period", period)
            .set("status", "Draft")
            .create(format!("Report '{title}' opened for {period}"))?;
        Ok(Self { inner })
    }

    pub fn publish(&mut self) -> Result<(), Error> {
        self.inner.update("Report submitted", |r| {
            r.set("status", "Published")?;
            Ok(())
        })?;
        self.inner.log_at(Level::SUCCESS, "Report published");
        Ok(())
    }
}

delegate_entity!(Report);
impl Tabular for Report {}

/// A client contract, versioned and timestamped.
#[derive(Debug)]
pub struct Contract {
    inner: Tracked,
}

impl Contract {
    pub fn schema() -> Result<Arc<Schema>, SchemaError> {
        Schema::builder("Contract")
            .integer("id")
            .text("description")
            .text("client")
            .number("amount")
            .text("status")
            .timestamps()
            .required("description")
            .primary("status")
            .build()
            .map(Arc::new)
    }

    pub fn new(id: i64, description: &str, client: &str, amount: f64) -> Result<Self, Error> {
        let inner = Tracked::builder(Self::schema()?)
            .set("id", id)
            .set("description", description)
            .set("client", client)
            .set("amount", amount)
            .set("status", "Created")
            .create("Creation", format!("Contract {id} created for {client}"))?;
        Ok(Self { inner })
    }

    fn id(&self) -> i64 {
        self.value_of("id").and_then(Value::as_integer).unwrap_or_default()
    }

    /// Change any of description, amount and client; `None` keeps the value.
    pub fn amend(
        &mut self,
        description: Option<&str>,
        amount: Option<f64>,
        client: Option<&str>,
    ) -> Result<(), Error> {
        let id = self.id();
        self.inner.log(format!("Amending contract {id}"));
        self.inner.checkpoint("Before amendment");
        self.inner.update(
            "After amendment",
            format!("Contract {id} amended"),
            |r| {
                if let Some(description) = description {
                    r.set("description", description)?;
                }
                if let Some(amount) = amount {
                    r.set("amount", amount)?;
                }
                if let Some(client) = client {
                    r.set("client", client)?;
                }
                r.set("status", "Amended")?;
                Ok(())
            },
        )?;
        Ok(())
    }

    pub fn validate(&mut self) -> Result<(), Error> {
        let id = self.id();
        self.inner
            .update("Validation", format!("Contract {id} validated"), |r| {
                r.set("status", "Validated")?;
                Ok(())
            })?;
        self.inner.touch("Contract validation")
    }

    pub fn tracked(&self) -> &Tracked {
        &self.inner
    }
}

delegate_entity!(Contract);
impl Tabular for Contract {}

/// A unit of work, versioned and timestamped, journaled at `DEBUG`.
#[derive(Debug)]
pub struct Task {
    inner: Tracked,
}

impl Task {
    pub fn schema() -> Result<Arc<Schema>, SchemaError> {
        Schema::builder("Task")
            .integer("id")
            .text("title")
            .text("assignee")
            .bool("done")
            .text("priority")
            .timestamps()
            .required("title")
            .primary("assignee")
            .build()
            .map(Arc::new)
    }

    pub fn new(id: i64, title: &str, assignee: &str) -> Result<Self, Error> {
        let inner = Tracked::builder(Self::schema()?)
            .level(Level::DEBUG)
            .set("id", id)
            .set("title", title)
            .set("assignee", assignee)
            .set("done", false)
            .set("priority", "Medium")
            .create("Creation", format!("Task '{title}' created"))?;
        Ok(Self { inner })
    }

    pub fn complete(&mut self) -> Result<(), Error> {
        let id = self.value_of("id").and_then(Value::as_integer).unwrap_or_default();
        self.inner
            .update("Completion", format!("Task {id} completed"), |r| {
                r.set("done", true)?;
                Ok(())
            })?;
        Ok(())
    }

    pub fn reassign(&mut self, assignee: &str) -> Result<(), Error> {
        guard::require_non_blank_str("assignee", assignee)?;
        let previous = text_of(self, "assignee").to_string();
        self.inner.update(
            format!("Reassignment: {previous} -> {assignee}"),
            format!("Task reassigned from {previous} to {assignee}"),
            |r| {
                r.set("assignee", assignee)?;
                Ok(())
            },
        )?;
        Ok(())
    }

    pub fn tracked(&self) -> &Tracked {
        &self.inner
    }
}

delegate_entity!(Task);
impl Tabular for Task {}

/// A customer order, versioned. Its product list flattens into one CSV cell.
#[derive(Debug)]
pub struct Order {
    inner: Tracked,
}

impl Order {
    pub fn schema() -> Result<Arc<Schema>, SchemaError> {
        Schema::builder("Order")
            .integer("id")
            .list("products")
            .text("client")
            .timestamp("ordered_at")
            .text("status")
            .number("total")
            .required("client")
            .primary("total")
            .build()
            .map(Arc::new)
    }

    pub fn new(id: i64, products: &[&str], client: &str) -> Result<Self, Error> {
        let schema = Self::schema()?;
        let inner = Tracked::builder(schema)
            .set("id", id)
            .set("products", products.to_vec())
            .set("client", client)
            .set("ordered_at", quill_common::Timestamp::now())
            .set("status", "Pending")
            .set("total", 0.0)
            .create("Creation", format!("Order {id} created for {client}"))?;
        Ok(Self { inner })
    }

    fn id(&self) -> i64 {
        self.value_of("id").and_then(Value::as_integer).unwrap_or_default()
    }

    fn products(&self) -> impl Iterator<Item = &str> {
        self.value_of("products")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_text)
    }

    /// Sum the listed prices of the ordered products; unknown products count as zero.
    pub fn compute_total(&mut self, prices: &BTreeMap<&str, f64>) -> Result<f64, Error> {
        let total: f64 = self
            .products()
            .map(|p| prices.get(p).copied().unwrap_or(0.0))
            .sum();
        let id = self.id();
        self.inner.update(
            format!("Total computed: {total}"),
            format!("Order {id} total: {total:.2}"),
            |r| {
                r.set("total", total)?;
                Ok(())
            },
        )?;
        Ok(total)
    }

    pub fn ship(&mut self) -> Result<(), Error> {
        let id = self.id();
        self.inner
            .update("Shipment", format!("Order {id} shipped"), |r| {
                r.set("status", "Shipped")?;
                Ok(())
            })?;
        Ok(())
    }

    pub fn tracked(&self) -> &Tracked {
        &self.inner
    }
}

delegate_entity!(Order);

impl Tabular for Order {
    fn to_record(&self) -> Result<Vec<(String, String)>, ExportError> {
        let row = self
            .schema()
            .attribute_names()
            .map(|name| {
                let cell = match name {
                    "products" => self.products().collect::<Vec<_>>().join(", "),
                    _ => self
                        .value_of(name)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                };
                (name.to_string(), cell)
            })
            .collect();
        Ok(row)
    }
}

/// The kinds of sample entity the CLI can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
    Document,
    Report,
    Contract,
    Task,
    Order,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::Document,
        Kind::Report,
        Kind::Contract,
        Kind::Task,
        Kind::Order,
    ];

    pub fn schema(self) -> Result<Arc<Schema>, SchemaError> {
        match self {
            Kind::Document => Document::schema(),
            Kind::Report => Report::schema(),
            Kind::Contract => Contract::schema(),
            Kind::Task => Task::schema(),
            Kind::Order => Order::schema(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Kind::Document => "document",
            Kind::Report => "report",
            Kind::Contract => "contract",
            Kind::Task => "task",
            Kind::Order => "order",
        })
    }
}

/// A sample entity after its demo scenario has run.
#[derive(Debug)]
pub enum Sample {
    Document(Document),
    Report(Report),
    Contract(Contract),
    Task(Task),
    Order(Order),
}

impl Sample {
    /// Build an entity of `kind` and walk it through a short lifecycle.
    pub fn scenario(kind: Kind) -> Result<Self, Error> {
        tracing::info!(%kind, "running scenario");
        Ok(match kind {
            Kind::Document => {
                let mut doc = Document::new("Architecture notes", "Draft outline", "Alice")?;
                doc.append("Storage layer section")?;
                doc.rename("Architecture decisions")?;
                Sample::Document(doc)
            }
            Kind::Report => {
                let mut report = Report::new("Quarterly report", "2024-Q1")?;
                report.publish()?;
                Sample::Report(report)
            }
            Kind::Contract => {
                let mut contract =
                    Contract::new(101, "Web site development", "ABC Corp", 5000.0)?;
                contract.amend(Some("E-commerce site development"), Some(5500.0), None)?;
                contract.validate()?;
                Sample::Contract(contract)
            }
            Kind::Task => {
                let mut task = Task::new(1, "Unit tests", "Alice")?;
                task.reassign("Bob")?;
                task.complete()?;
                Sample::Task(task)
            }
            Kind::Order => {
                let mut order = Order::new(1001, &["Laptop", "Mouse", "Keyboard"], "Jane Doe")?;
                let prices =
                    BTreeMap::from([("Laptop", 999.99), ("Mouse", 25.50), ("Keyboard", 75.00)]);
                order.compute_total(&prices)?;
                order.ship()?;
                Sample::Order(order)
            }
        })
    }

    pub fn entity(&self) -> &dyn Tabular {
        match self {
            Sample::Document(e) => e,
            Sample::Report(e) => e,
            Sample::Contract(e) => e,
            Sample::Task(e) => e,
            Sample::Order(e) => e,
        }
    }

    pub fn journal(&self) -> &Journal {
        match self {
            Sample::Document(e) => e.inner.journal(),
            Sample::Report(e) => e.inner.journal(),
            Sample::Contract(e) => e.inner.journal(),
            Sample::Task(e) => e.inner.journal(),
            Sample::Order(e) => e.inner.journal(),
        }
    }

    /// The versioned view, for kinds that keep a history.
    pub fn tracked(&self) -> Option<&Tracked> {
        match self {
            Sample::Contract(e) => Some(e.tracked()),
            Sample::Task(e) => Some(e.tracked()),
            Sample::Order(e) => Some(e.tracked()),
            Sample::Document(_) | Sample::Report(_) => None,
        }
    }

    pub fn history(&self) -> Option<&HistorySeries> {
        self.tracked().map(Tracked::history)
    }

    /// Render in `format`, with the history when asked and available.
    pub fn export(&self, format: Format, with_history: bool) -> Result<String, Error> {
        let history = self.history().filter(|_| with_history);
        Ok(quill_export::render(self.entity(), format, history)?)
    }

    pub fn export_journal(&self, format: &str) -> Result<String, Error> {
        Ok(self.journal().export_as(format)?)
    }
}
