//! One-shot commands: session management and mutations.

use crate::prompt::{self, Terminal};
use crate::session_store::SessionStore;
use crate::{
    AdminCommand, LoginArgs, PasswordCommand, PlantCommand, PlantRegisterArgs, ReportArgs,
    TaskCommand, UserCommand,
};
use anyhow::{anyhow, bail, Context, Result};
use solar_sync::mutation::{
    AdminRegistration, LoginForm, PasswordReset, PlantRegistration, ReportRequest, UserRegistration,
};
use solar_sync::resources::{Admins, Plants, Resource, UpcomingMaintenance, Users};
use solar_sync::{
    Dashboard, GateDecision, MutationModal, MutationOutcome, Mutations, PatchBuilder, Role, Route,
    Row, SyncResult,
};
use std::sync::Arc;
use tracing::{debug, info};

fn require_access(dashboard: &Dashboard, route: &Route) -> Result<()> {
    match dashboard.gate().check(route) {
        GateDecision::Admit(_) => Ok(()),
        GateDecision::Redirect(to) => bail!(
            "{} needs a session with access (redirected to {}). Run `solar-console login` first.",
            route,
            to
        ),
    }
}

/// Current rows of `resource`, then the one whose id matches
async fn find_row<Res: Resource>(dashboard: &Dashboard, resource: Res, id: &str) -> Result<Res::Row> {
    let rows = dashboard
        .fetcher()
        .fetch_once(&resource, &dashboard.params())
        .await
        .with_context(|| format!("Failed to load {}", resource.endpoint().key()))?;
    let mut view = dashboard.table(&resource);
    view.set_rows(Arc::new(rows));
    view.select(id)
        .cloned()
        .ok_or_else(|| anyhow!("No {} entry with id '{}'", resource.endpoint().key(), id))
}

fn announce(outcome: SyncResult<MutationOutcome>) -> Result<()> {
    let outcome = outcome?;
    if outcome.success {
        println!("✅ {}", outcome.message);
        Ok(())
    } else {
        bail!("❌ {}", outcome.message)
    }
}

/// Run one submit through a modal so success and failure take the modal's path
async fn submit<R, F>(row: R, request: F) -> Result<()>
where
    R: Row,
    F: std::future::Future<Output = SyncResult<MutationOutcome>>,
{
    let mut modal: MutationModal<R> = MutationModal::new();
    modal.open(row);
    modal.begin_submit();
    let outcome = request.await?;
    modal.finish(&outcome);
    match modal.error() {
        Some(error) => bail!("❌ {}", error),
        None => {
            println!("✅ {}", outcome.message);
            Ok(())
        }
    }
}

fn edit(patch: &mut PatchBuilder, key: &str, value: Option<String>) {
    if let Some(value) = value {
        patch.edit(key, value);
    }
}

fn new_password() -> Result<(String, String)> {
    Terminal::stdio().new_password()
}

fn confirm(question: &str) -> Result<bool> {
    Terminal::stdio().confirm(question, false)
}

// --- Session ---

pub async fn login(dashboard: &Dashboard, store: &SessionStore, args: LoginArgs) -> Result<()> {
    if args.role == Role::User && args.plant.as_deref().map_or(true, |p| p.trim().is_empty()) {
        bail!("--plant is required for {} sessions", args.role);
    }
    let password = prompt::secret_or_ask(args.password, "Password")?;
    let form = LoginForm { plant_id: args.plant, user_id: args.user, password, role: args.role };

    announce(dashboard.mutations().login(&form).await)?;
    store.save(dashboard.session()).await?;
    Ok(())
}

pub async fn logout(dashboard: &Dashboard, store: &SessionStore) -> Result<()> {
    dashboard.mutations().logout();
    store.clear().await?;
    println!("👋 Signed out.");
    Ok(())
}

pub fn whoami(dashboard: &Dashboard) {
    let session = dashboard.session().snapshot();
    if !session.is_authenticated {
        println!("Not signed in.");
        return;
    }
    println!(
        "{} ({}){}",
        session.user_id().unwrap_or("-"),
        session.role.map(|r| r.as_str()).unwrap_or("-"),
        session.plant_id().map(|p| format!(" on plant {p}")).unwrap_or_default()
    );
}

// --- Access portal ---

pub async fn plant(dashboard: &Dashboard, cmd: PlantCommand) -> Result<()> {
    let mutations = dashboard.mutations();
    match cmd {
        PlantCommand::Register(args) => {
            require_access(dashboard, &Route::AccessPortal("register-plant".into()))?;
            announce(mutations.register_plant(registration(args)).await)
        }
        PlantCommand::Update { plant_id, name, contact_name, contact_email } => {
            require_access(dashboard, &Route::AccessPortal("plants".into()))?;
            let row = find_row(dashboard, Plants, &plant_id).await?;
            let mut patch = Mutations::plant_patch(&row)?;
            edit(&mut patch, "Plant_name", name);
            edit(&mut patch, "primary_contact_name", contact_name);
            edit(&mut patch, "primary_contact_email", contact_email);
            debug!("Plant patch: {:?}", patch.build());
            submit(row, mutations.update_plant(&patch)).await
        }
        PlantCommand::Delete { plant_id } => {
            require_access(dashboard, &Route::AccessPortal("plants".into()))?;
            let row = find_row(dashboard, Plants, &plant_id).await?;
            if !confirm(&format!("Delete plant {}?", row.plant_id))? {
                return Ok(());
            }
            submit(row.clone(), mutations.delete_plant(&row)).await
        }
    }
}

fn registration(args: PlantRegisterArgs) -> PlantRegistration {
    PlantRegistration {
        plant_name: args.name,
        address: args.address,
        country: args.country,
        state: args.state,
        city: args.city,
        postal_code: args.postal_code,
        geolocation: args.geolocation,
        primary_contact_name: args.contact_name,
        primary_contact_phone: args.contact_phone,
        primary_contact_email: args.contact_email,
        total_smb_count: args.smbs,
        total_string_count: args.strings,
        total_panel_count: args.panels,
        plant_capacity: args.capacity,
        status: args.status,
        permits_file: args.permits,
        ..PlantRegistration::default()
    }
}

pub async fn admin(dashboard: &Dashboard, cmd: AdminCommand) -> Result<()> {
    let mutations = dashboard.mutations();
    match cmd {
        AdminCommand::Register { plant, email, phone } => {
            require_access(dashboard, &Route::AccessPortal("register-admin".into()))?;
            let (password, confirm_password) = new_password()?;
            let form = AdminRegistration { plant_id: plant, email, phone, password, confirm_password };
            announce(mutations.register_admin(&form).await)
        }
        AdminCommand::Update { user_id, email, phone } => {
            require_access(dashboard, &Route::AccessPortal("admins".into()))?;
            let row = find_row(dashboard, Admins, &user_id).await?;
            let mut patch = Mutations::admin_patch(&row);
            edit(&mut patch, "email", email);
            edit(&mut patch, "phone_number", phone);
            submit(row.clone(), mutations.update_admin(&row, &patch)).await
        }
        AdminCommand::Delete { user_id } => {
            require_access(dashboard, &Route::AccessPortal("admins".into()))?;
            let row = find_row(dashboard, Admins, &user_id).await?;
            if !confirm(&format!("Delete admin {} of {}?", row.admin_user_id, row.plant_id))? {
                return Ok(());
            }
            submit(row.clone(), mutations.delete_admin(&row)).await
        }
    }
}

// --- Plant screens ---

pub async fn user(dashboard: &Dashboard, cmd: UserCommand) -> Result<()> {
    require_access(dashboard, &Route::UserInformation)?;
    let mutations = dashboard.mutations();
    match cmd {
        UserCommand::Add { email, phone } => {
            let (password, confirm_password) = new_password()?;
            let form = UserRegistration { email, phone, password, confirm_password };
            announce(mutations.add_user(&form).await)
        }
        UserCommand::Update { user_id, email, phone } => {
            let row = find_row(dashboard, Users, &user_id).await?;
            let mut patch = Mutations::user_patch(&row)?;
            edit(&mut patch, "email", email);
            edit(&mut patch, "phone", phone);
            submit(row, mutations.update_user(&patch)).await
        }
        UserCommand::Delete { user_id } => {
            let row = find_row(dashboard, Users, &user_id).await?;
            if !confirm(&format!("Delete user {}?", row.user_id))? {
                return Ok(());
            }
            submit(row.clone(), mutations.delete_user(&row)).await
        }
    }
}

pub async fn task(dashboard: &Dashboard, cmd: TaskCommand) -> Result<()> {
    require_access(dashboard, &Route::Maintenance)?;
    let mutations = dashboard.mutations();
    match cmd {
        TaskCommand::Update { task_id, name, description } => {
            let row = find_row(dashboard, UpcomingMaintenance, &task_id).await?;
            let mut patch = Mutations::task_patch(&row);
            edit(&mut patch, "task_name", name);
            edit(&mut patch, "task_description", description);
            if patch.build().is_empty() {
                info!("Task {} unchanged, nothing sent", row.task_id);
                println!("Nothing changed.");
                return Ok(());
            }
            submit(row.clone(), mutations.update_task(&row, &patch)).await
        }
        TaskCommand::Complete { task_id } => {
            let row = find_row(dashboard, UpcomingMaintenance, &task_id).await?;
            submit(row.clone(), mutations.complete_task(&row)).await
        }
    }
}

pub async fn report(dashboard: &Dashboard, args: ReportArgs) -> Result<()> {
    require_access(dashboard, &Route::Reports)?;
    let request = ReportRequest {
        start_date: args.from,
        end_date: args.to,
        report_type: args.report_type,
        data_type: args.data_type,
        smbs: args.smbs,
    };
    announce(dashboard.mutations().generate_report(&request).await)
}

// --- Password reset ---

pub async fn password(dashboard: &Dashboard, cmd: PasswordCommand) -> Result<()> {
    let mutations = dashboard.mutations();
    match cmd {
        PasswordCommand::SendOtp { user, email } => announce(mutations.send_otp(&user, &email).await),
        PasswordCommand::VerifyOtp { user, email, otp } => {
            announce(mutations.verify_otp(&user, &email, &otp).await)
        }
        PasswordCommand::ResendOtp { user, email } => announce(mutations.resend_otp(&user, &email).await),
        PasswordCommand::Reset { user, email } => {
            let (password, confirm_password) = new_password()?;
            let reset = PasswordReset { user_id: user, email, password, confirm_password };
            announce(mutations.reset_password(&reset).await)
        }
    }
}
