//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! Diesel uses them for compile-time query validation.

diesel::table! {
    /// Tracked projects.
    projects (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique display name.
        name -> Varchar,
        /// URL slug, derived once on creation.
        slug -> Varchar,
        /// Free-text description source.
        description -> Text,
        /// Rendered markup for the description.
        html -> Text,
        /// Optional external project URL.
        url -> Nullable<Varchar>,
        /// Owning identity from the external identity provider.
        owner -> Varchar,
        /// Additional authorized identities.
        other_users -> Array<Text>,
        /// Shared secret the webhook endpoint is keyed on.
        hook_secret -> Varchar,
        /// Record creation timestamp.
        created_date -> Timestamptz,
    }
}

diesel::table! {
    /// Reported issues.
    issues (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Free-text description source.
        description -> Text,
        /// Rendered markup for the description.
        html -> Text,
        /// Optional notification email.
        email -> Nullable<Varchar>,
        /// Immutable path derived on creation.
        internal_url -> Varchar,
        /// Per-project monotonic identifier.
        identifier -> Int8,
        /// Whether the issue is currently fixed.
        fixed -> Bool,
        /// Timestamp of the most recent fix transition.
        fixed_date -> Nullable<Timestamptz>,
        /// Optional summary of the fix.
        fixed_description -> Nullable<Text>,
        /// Record creation timestamp.
        created_date -> Timestamptz,
    }
}

diesel::table! {
    /// Per-project identifier counters.
    counters (project_id) {
        /// Owning project; one counter per project.
        project_id -> Uuid,
        /// Number of identifiers allocated so far.
        count -> Int8,
    }
}

diesel::joinable!(issues -> projects (project_id));
diesel::joinable!(counters -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(projects, issues, counters);
