//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lower-cased.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        full_name -> Varchar,
        register_number -> Varchar,
        department -> Varchar,
        year -> Int4,
        semester -> Int4,
        section -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        avatar_url -> Nullable<Text>,
        theme -> Varchar,
        timezone -> Varchar,
        notification_prefs -> Jsonb,
        oauth_provider -> Nullable<Varchar>,
        oauth_id -> Nullable<Varchar>,
        is_active -> Bool,
        is_verified -> Bool,
        last_login_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    subjects (id) {
        id -> Uuid,
        code -> Varchar,
        name -> Varchar,
        short_name -> Nullable<Varchar>,
        subject_type -> Varchar,
        credits -> Nullable<Int4>,
        department -> Nullable<Varchar>,
        semester -> Nullable<Int4>,
        color -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    staff (id) {
        id -> Uuid,
        name -> Varchar,
        title -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        department -> Nullable<Varchar>,
        designation -> Nullable<Varchar>,
        cabin -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    venues (id) {
        id -> Uuid,
        name -> Varchar,
        building -> Nullable<Varchar>,
        floor -> Nullable<Int4>,
        capacity -> Nullable<Int4>,
        venue_type -> Varchar,
        /// JSON array of facility names.
        facilities -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user timetable blocks. Catalog references carry no foreign keys.
    timetable_slots (id) {
        id -> Uuid,
        user_id -> Uuid,
        subject_id -> Nullable<Uuid>,
        staff_id -> Nullable<Uuid>,
        venue_id -> Nullable<Uuid>,
        /// 0 = Sunday .. 6 = Saturday.
        day_of_week -> Int2,
        start_time -> Time,
        end_time -> Time,
        period_number -> Nullable<Int4>,
        slot_type -> Varchar,
        is_recurring -> Bool,
        /// Present only when `is_recurring` is false.
        specific_date -> Nullable<Date>,
        notes -> Nullable<Text>,
        batch_filter -> Nullable<Varchar>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    assignments (id) {
        id -> Uuid,
        user_id -> Uuid,
        subject_id -> Nullable<Uuid>,
        staff_id -> Nullable<Uuid>,
        title -> Varchar,
        description -> Nullable<Text>,
        instructions -> Nullable<Text>,
        assignment_type -> Varchar,
        assigned_date -> Nullable<Date>,
        due_date -> Timestamptz,
        submitted_at -> Nullable<Timestamptz>,
        status -> Varchar,
        max_marks -> Nullable<Float8>,
        obtained_marks -> Nullable<Float8>,
        feedback -> Nullable<Text>,
        priority -> Varchar,
        estimated_hours -> Nullable<Float8>,
        actual_hours -> Nullable<Float8>,
        reminder_enabled -> Bool,
        reminder_before_hours -> Int4,
        tags -> Array<Text>,
        is_recurring -> Bool,
        recurrence_pattern -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    subjects,
    staff,
    venues,
    timetable_slots,
    assignments,
);
