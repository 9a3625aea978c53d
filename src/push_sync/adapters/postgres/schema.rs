//! Diesel schema for push synchronisation persistence.

diesel::table! {
    /// Projects that receive push webhooks.
    projects (id) {
        /// Project identifier.
        id -> Int8,
        /// Display name.
        #[max_length = 555]
        name -> Varchar,
    }
}

diesel::table! {
    /// Work items addressed by commit references.
    work_items (id) {
        /// Work item identifier, as written in `TASK-<id>` references.
        id -> Int8,
        /// Work item title.
        #[max_length = 255]
        title -> Varchar,
        /// Canonical status.
        #[max_length = 50]
        status -> Varchar,
        /// Owning project, if any.
        project_id -> Nullable<Int8>,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of processed pushes.
    project_activity_logs (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Int8,
        /// Activity payload document.
        activity -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(work_items -> projects (project_id));
diesel::joinable!(project_activity_logs -> projects (project_id));
diesel::allow_tables_to_appear_in_same_query!(projects, work_items, project_activity_logs);
