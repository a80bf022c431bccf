//! Financial ledger [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{assignment, finance, Expense, Payment, Transaction},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Insert<Transaction>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(transaction): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transaction {
            id,
            kind,
            amount,
            description,
            created_by,
            created_at,
        } = transaction;

        const SQL: &str = "\
            INSERT INTO financial_transactions (\
                id, kind, amount, description, created_by, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::INT2, $3::NUMERIC, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &kind, &amount, &description, &created_by, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            transaction_id,
            interpreter_id,
            assignment_id,
            amount,
            method,
            status,
            scheduled_at,
            processed_at,
            reference,
            created_at,
            updated_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO interpreter_payments (\
                id, transaction_id, interpreter_id, assignment_id, \
                amount, method, status, \
                scheduled_at, processed_at, \
                reference, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::NUMERIC, $6::INT2, $7::INT2, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, \
                $10::VARCHAR, \
                $11::TIMESTAMPTZ, $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                method = EXCLUDED.method, \
                scheduled_at = EXCLUDED.scheduled_at, \
                processed_at = EXCLUDED.processed_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &transaction_id,
                &interpreter_id,
                &assignment_id,
                &amount,
                &method,
                &status,
                &scheduled_at,
                &processed_at,
                &reference,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Option<read::payment::Latest>, assignment::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::payment::Latest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::payment::Latest>, assignment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: assignment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, transaction_id, interpreter_id, assignment_id, \
                   amount, method, status, \
                   scheduled_at, processed_at, \
                   reference, \
                   created_at, updated_at \
            FROM interpreter_payments \
            WHERE assignment_id = $1::UUID \
            ORDER BY created_at DESC \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| {
                read::payment::Latest(Payment {
                    id: row.get("id"),
                    transaction_id: row.get("transaction_id"),
                    interpreter_id: row.get("interpreter_id"),
                    assignment_id: row.get("assignment_id"),
                    amount: row.get("amount"),
                    method: row.get("method"),
                    status: row.get("status"),
                    scheduled_at: row.get("scheduled_at"),
                    processed_at: row.get("processed_at"),
                    reference: row.get("reference"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                })
            }))
    }
}

impl<C> Database<Insert<Expense>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Expense>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(expense): Insert<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(expense)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Expense>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(expense): Update<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        let Expense {
            id,
            transaction_id,
            kind,
            amount,
            description,
            status,
            incurred_at,
            paid_at,
        } = expense;

        const SQL: &str = "\
            INSERT INTO expenses (\
                id, transaction_id, kind, amount, description, status, \
                incurred_at, paid_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::NUMERIC, \
                $5::VARCHAR, $6::INT2, \
                $7::TIMESTAMPTZ, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                paid_at = EXCLUDED.paid_at";
        self.exec(
            SQL,
            &[
                &id,
                &transaction_id,
                &kind,
                &amount,
                &description,
                &status,
                &incurred_at,
                &paid_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Option<Expense>, finance::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Expense>, finance::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let transaction_id: finance::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, transaction_id, kind, amount, description, status, \
                   incurred_at, paid_at \
            FROM expenses \
            WHERE transaction_id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&transaction_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Expense {
                id: row.get("id"),
                transaction_id: row.get("transaction_id"),
                kind: row.get("kind"),
                amount: row.get("amount"),
                description: row.get("description"),
                status: row.get("status"),
                incurred_at: row.get("incurred_at"),
                paid_at: row.get("paid_at"),
            }))
    }
}
