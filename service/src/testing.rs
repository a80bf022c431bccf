//! In-memory doubles of the [`Database`] and [`Mailer`] ports, backing
//! command tests without a live Postgres or delivery endpoint.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use common::{
    operations::{By, Commit, Deliver, Insert, Lock, Select, Transact, Update},
    Hours, Rate,
};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    dispatch,
    domain::{
        assignment::{
            self, CreationDateTime, Language, Location, ServiceType,
            StartDateTime, Status, Text, UpdateDateTime,
        },
        audit, contact, interpreter, Assignment, Expense, Interpreter,
        Payment, Transaction,
    },
    infra::{
        database,
        mailer::{self, Email},
        Database, Mailer,
    },
    read, token, Config, Service,
};

/// In-memory [`Database`] double.
#[derive(Clone, Debug, Default)]
pub(crate) struct InMemory {
    /// Shared [`State`] of this [`InMemory`] database.
    pub(crate) state: Arc<Mutex<State>>,
}

/// State held by an [`InMemory`] database.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) assignments: HashMap<assignment::Id, Assignment>,
    pub(crate) interpreters: HashMap<interpreter::Id, Interpreter>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) payments: Vec<Payment>,
    pub(crate) expenses: Vec<Expense>,
    pub(crate) audit: Vec<audit::Entry>,
}

impl Database<Transact> for InMemory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Assignment, assignment::Id>>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Assignment, assignment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Assignment>, assignment::Id>>> for InMemory {
    type Ok = Option<Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Assignment>, assignment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state.lock().unwrap().assignments.get(&id).cloned())
    }
}

impl Database<Insert<Assignment>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .state
            .lock()
            .unwrap()
            .assignments
            .insert(assignment.id, assignment);
        Ok(())
    }
}

impl Database<Select<By<Option<Interpreter>, interpreter::Id>>> for InMemory {
    type Ok = Option<Interpreter>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Interpreter>, interpreter::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state.lock().unwrap().interpreters.get(&id).cloned())
    }
}

impl Database<Insert<Interpreter>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(interpreter): Insert<Interpreter>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .state
            .lock()
            .unwrap()
            .interpreters
            .insert(interpreter.id, interpreter);
        Ok(())
    }
}

impl Database<Insert<Transaction>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(transaction): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state.lock().unwrap().transactions.push(transaction);
        Ok(())
    }
}

impl Database<Insert<Payment>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state.lock().unwrap().payments.push(payment);
        Ok(())
    }
}

impl Database<Update<Payment>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().unwrap();
        if let Some(stored) =
            state.payments.iter_mut().find(|p| p.id == payment.id)
        {
            *stored = payment;
        } else {
            state.payments.push(payment);
        }
        Ok(())
    }
}

impl Database<Select<By<Option<read::payment::Latest>, assignment::Id>>>
    for InMemory
{
    type Ok = Option<read::payment::Latest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::payment::Latest>, assignment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state
            .lock()
            .unwrap()
            .payments
            .iter()
            .rev()
            .find(|p| p.assignment_id == id)
            .cloned()
            .map(read::payment::Latest))
    }
}

impl Database<Insert<Expense>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(expense): Insert<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state.lock().unwrap().expenses.push(expense);
        Ok(())
    }
}

impl Database<Update<Expense>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(expense): Update<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().unwrap();
        if let Some(stored) =
            state.expenses.iter_mut().find(|e| e.id == expense.id)
        {
            *stored = expense;
        } else {
            state.expenses.push(expense);
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Expense>, crate::domain::finance::Id>>>
    for InMemory
{
    type Ok = Option<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Expense>, crate::domain::finance::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let transaction_id = by.into_inner();
        Ok(self
            .state
            .lock()
            .unwrap()
            .expenses
            .iter()
            .find(|e| e.transaction_id == transaction_id)
            .cloned())
    }
}

impl Database<Insert<audit::Entry>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<audit::Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state.lock().unwrap().audit.push(entry);
        Ok(())
    }
}

/// [`Mailer`] double recording every delivered [`Email`].
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingMailer {
    /// Delivered [`Email`]s.
    pub(crate) sent: Arc<Mutex<Vec<Email>>>,

    /// Whether deliveries fail.
    pub(crate) fail: Arc<AtomicBool>,
}

impl Mailer<Deliver<Email>> for RecordingMailer {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Deliver(email): Deliver<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(tracerr::new!(mailer::Error::Rejected(500)));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Creates a fully wired [`Service`] over in-memory doubles.
pub(crate) fn service(
) -> (Service<InMemory, RecordingMailer>, InMemory, RecordingMailer) {
    let database = InMemory::default();
    let mailer = RecordingMailer::default();

    let config = Config {
        tokens: token::Signer::new(b"test-secret", token::Signer::VALIDITY),
        notices: dispatch::Config {
            sender: contact::Email::new("desk@agency.example").unwrap(),
            admin_recipients: vec![contact::Email::new("ops@agency.example")
                .unwrap()],
            public_url: "https://agency.example".into(),
            domain: "agency.example".into(),
        },
        payment_terms: Duration::from_secs(14 * 24 * 60 * 60),
    };

    let (service, bg) = Service::new(config, database.clone(), mailer.clone());
    // The welcome queue is drained by `bg`, which tests never drive.
    drop(bg);

    (service, database, mailer)
}

/// Creates an [`Interpreter`] with the provided email address.
pub(crate) fn interpreter(email: Option<&str>) -> Interpreter {
    Interpreter {
        id: interpreter::Id::new(),
        name: contact::Name::new("Maria Lopez").unwrap(),
        email: email.map(|e| contact::Email::new(e).unwrap()),
        phone: contact::Phone::new("617-555-0142"),
        rate: Some(Rate::from(Decimal::from(50))),
        active: true,
        created_at: interpreter::CreationDateTime::now(),
    }
}

/// Creates an [`Assignment`] in the provided [`Status`], billing 50/hour
/// with a 2-hour minimum over a 1-hour mission (a 100 total).
pub(crate) fn assignment(
    status: Status,
    interpreter_id: Option<interpreter::Id>,
) -> Assignment {
    let start_at = StartDateTime::now();
    let mut assignment = Assignment {
        id: assignment::Id::new(),
        client_name: contact::Name::new("Acme Health"),
        client_email: None,
        client_phone: None,
        interpreter_id,
        service_type: ServiceType::new("Medical Interpretation").unwrap(),
        source_language: Language::new("English").unwrap(),
        target_language: Language::new("Spanish").unwrap(),
        start_at,
        end_at: (start_at + Duration::from_secs(3600)).coerce(),
        location: Location {
            address: Text::new("123 Main St").unwrap(),
            city: Text::new("Boston").unwrap(),
            state: Text::new("MA").unwrap(),
            zip_code: Text::new("02108").unwrap(),
        },
        status,
        rate: Rate::from(Decimal::from(50)),
        minimum_hours: Hours::from(2_u32),
        total_payment: None,
        is_paid: None,
        notes: None,
        special_requirements: None,
        created_at: CreationDateTime::now(),
        updated_at: UpdateDateTime::now(),
        completed_at: None,
    };
    assignment.total_payment = Some(assignment.total_payment());
    assignment
}

/// Seeds the provided [`InMemory`] database with the provided records.
pub(crate) fn seed(
    database: &InMemory,
    interpreters: impl IntoIterator<Item = Interpreter>,
    assignments: impl IntoIterator<Item = Assignment>,
) {
    let mut state = database.state.lock().unwrap();
    for i in interpreters {
        _ = state.interpreters.insert(i.id, i);
    }
    for a in assignments {
        _ = state.assignments.insert(a.id, a);
    }
}
