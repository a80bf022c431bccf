//! Audit log [`Database`] implementations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::audit,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<audit::Entry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<audit::Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        let audit::Entry {
            id,
            actor,
            action,
            target,
            target_id,
            changes,
            recorded_at,
        } = entry;

        const SQL: &str = "\
            INSERT INTO audit_log (\
                id, actor, action, target, target_id, changes, recorded_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::UUID, \
                $6::JSONB, \
                $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &actor,
                &action.to_string(),
                &target.to_string(),
                &target_id,
                &changes,
                &recorded_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
