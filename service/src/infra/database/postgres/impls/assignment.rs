//! [`Assignment`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{assignment, Assignment},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<assignment::Id, Assignment>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[assignment::Id]>,
{
    type Ok = HashMap<assignment::Id, Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<assignment::Id, Assignment>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[assignment::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, \
                   client_name, client_email, client_phone, \
                   interpreter_id, \
                   service_type, source_language, target_language, \
                   start_at, end_at, \
                   address, city, state, zip_code, \
                   status, \
                   rate, minimum_hours, total_payment, is_paid, \
                   notes, special_requirements, \
                   created_at, updated_at, completed_at \
            FROM assignments \
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
                    Assignment {
                        id,
                        client_name: row.get("client_name"),
                        client_email: row.get("client_email"),
                        client_phone: row.get("client_phone"),
                        interpreter_id: row.get("interpreter_id"),
                        service_type: row.get("service_type"),
                        source_language: row.get("source_language"),
                        target_language: row.get("target_language"),
                        start_at: row.get("start_at"),
                        end_at: row.get("end_at"),
                        location: assignment::Location {
                            address: row.get("address"),
                            city: row.get("city"),
                            state: row.get("state"),
                            zip_code: row.get("zip_code"),
                        },
                        status: row.get("status"),
                        rate: row.get("rate"),
                        minimum_hours: row.get("minimum_hours"),
                        total_payment: row.get("total_payment"),
                        is_paid: row.get("is_paid"),
                        notes: row.get("notes"),
                        special_requirements: row.get("special_requirements"),
                        created_at: row.get("created_at"),
                        updated_at: row.get("updated_at"),
                        completed_at: row.get("completed_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Assignment>, assignment::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<assignment::Id, Assignment>, [assignment::Id; 1]>>,
        Ok = HashMap<assignment::Id, Assignment>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Assignment>, assignment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Assignment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Assignment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(assignment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Assignment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(assignment): Update<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Assignment {
            id,
            client_name,
            client_email,
            client_phone,
            interpreter_id,
            service_type,
            source_language,
            target_language,
            start_at,
            end_at,
            location:
                assignment::Location {
                    address,
                    city,
                    state,
                    zip_code,
                },
            status,
            rate,
            minimum_hours,
            total_payment,
            is_paid,
            notes,
            special_requirements,
            created_at,
            updated_at,
            completed_at,
        } = assignment;

        const SQL: &str = "\
            INSERT INTO assignments (\
                id, \
                client_name, client_email, client_phone, \
                interpreter_id, \
                service_type, source_language, target_language, \
                start_at, end_at, \
                address, city, state, zip_code, \
                status, \
                rate, minimum_hours, total_payment, is_paid, \
                notes, special_requirements, \
                created_at, updated_at, completed_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::UUID, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, \
                $9::TIMESTAMPTZ, $10::TIMESTAMPTZ, \
                $11::VARCHAR, $12::VARCHAR, $13::VARCHAR, $14::VARCHAR, \
                $15::INT2, \
                $16::NUMERIC, $17::NUMERIC, $18::NUMERIC, $19::BOOL, \
                $20::VARCHAR, $21::VARCHAR, \
                $22::TIMESTAMPTZ, $23::TIMESTAMPTZ, $24::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET client_name = EXCLUDED.client_name, \
                client_email = EXCLUDED.client_email, \
                client_phone = EXCLUDED.client_phone, \
                interpreter_id = EXCLUDED.interpreter_id, \
                service_type = EXCLUDED.service_type, \
                source_language = EXCLUDED.source_language, \
                target_language = EXCLUDED.target_language, \
                start_at = EXCLUDED.start_at, \
                end_at = EXCLUDED.end_at, \
                address = EXCLUDED.address, \
                city = EXCLUDED.city, \
                state = EXCLUDED.state, \
                zip_code = EXCLUDED.zip_code, \
                status = EXCLUDED.status, \
                rate = EXCLUDED.rate, \
                minimum_hours = EXCLUDED.minimum_hours, \
                total_payment = EXCLUDED.total_payment, \
                is_paid = EXCLUDED.is_paid, \
                notes = EXCLUDED.notes, \
                special_requirements = EXCLUDED.special_requirements, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at, \
                completed_at = EXCLUDED.completed_at";
        self.exec(
            SQL,
            &[
                &id,
                &client_name,
                &client_email,
                &client_phone,
                &interpreter_id,
                &service_type,
                &source_language,
                &target_language,
                &start_at,
                &end_at,
                &address,
                &city,
                &state,
                &zip_code,
                &status,
                &rate,
                &minimum_hours,
                &total_payment,
                &is_paid,
                &notes,
                &special_requirements,
                &created_at,
                &updated_at,
                &completed_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Assignment, assignment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Assignment, assignment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: assignment::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO assignments_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<read::assignment::list::Page, read::assignment::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::assignment::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::assignment::list::Page, read::assignment::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::assignment::list::Selector {
            arguments,
            filter:
                read::assignment::list::Filter {
                    status,
                    client_name,
                },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let name_pattern =
            client_name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let name_pattern_idx = name_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let sql = format!(
            "SELECT id, status \
             FROM assignments \
             WHERE TRUE \
                   {cursor} \
                   {status_filtering} \
                   {name_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx
                .map(|idx| {
                    let op = arguments.kind().operator();
                    format!("AND id {op} ${idx}::UUID")
                })
                .unwrap_or_default(),
            order = arguments.kind().order().sql(),
            status_filtering = status_idx
                .map(|idx| format!("AND status = ${idx}::INT2"))
                .unwrap_or_default(),
            name_filtering = name_pattern_idx
                .map(|idx| {
                    format!(
                        "AND LOWER(client_name) SIMILAR TO \
                         LOWER(${idx}::VARCHAR)"
                    )
                })
                .unwrap_or_default(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id: assignment::Id = row.get("id");
                (id, (id, row.get("status")))
            })
            .collect::<Vec<_>>();

        Ok(read::assignment::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::assignment::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::assignment::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::assignment::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM assignments";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
