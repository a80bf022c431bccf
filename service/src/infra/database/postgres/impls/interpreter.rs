//! [`Interpreter`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{interpreter, Interpreter},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<interpreter::Id, Interpreter>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[interpreter::Id]>,
{
    type Ok = HashMap<interpreter::Id, Interpreter>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<interpreter::Id, Interpreter>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[interpreter::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, name, email, phone, rate, active, created_at \
            FROM interpreters \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Interpreter {
                        id,
                        name: row.get("name"),
                        email: row.get("email"),
                        phone: row.get("phone"),
                        rate: row.get("rate"),
                        active: row.get("active"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Interpreter>, interpreter::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<HashMap<interpreter::Id, Interpreter>, [interpreter::Id; 1]>,
        >,
        Ok = HashMap<interpreter::Id, Interpreter>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Interpreter>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Interpreter>, interpreter::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Interpreter>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Interpreter>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(interpreter): Insert<Interpreter>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(interpreter))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Interpreter>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(interpreter): Update<Interpreter>,
    ) -> Result<Self::Ok, Self::Err> {
        let Interpreter {
            id,
            name,
            email,
            phone,
            rate,
            active,
            created_at,
        } = interpreter;

        const SQL: &str = "\
            INSERT INTO interpreters (\
                id, name, email, phone, rate, active, created_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::NUMERIC, $6::BOOL, \
                $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                rate = EXCLUDED.rate, \
                active = EXCLUDED.active, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[&id, &name, &email, &phone, &rate, &active, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
