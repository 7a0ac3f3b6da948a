use chrono::NaiveDate;

use super::leave_lifecycle::{
    identity_selection_store_error, leave_store_error, profile_store_error,
};
use super::opportunities::upcoming_opportunities;
use crate::{
    app_state::AppState,
    domain::{
        roster, shift_for, IdentitySelectionState,
        IdentitySelectionStoreError, IdentityStep, LeaveAPIError, LineUserId,
        MemberName, ProfileStoreError, Role, Team, UserProfile,
    },
    utils::constants::UPCOMING_OPPORTUNITY_DAYS,
};

/// A text command sent to the bot.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register,
    Reselect,
    QueryOvertime,
    Status,
    Help,
    Notifications(bool),
    AdminReset(String),
    Yes,
    No,
    /// Anything else; answers a pending prompt when there is one.
    Text(String),
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let lower = text.to_lowercase();
        match lower.as_str() {
            "register" | "select name" => Command::Register,
            "reselect name" => Command::Reselect,
            "overtime" | "query overtime" => Command::QueryOvertime,
            "status" | "my status" => Command::Status,
            "help" => Command::Help,
            "notifications on" => Command::Notifications(true),
            "notifications off" => Command::Notifications(false),
            "yes" | "y" => Command::Yes,
            "no" | "n" => Command::No,
            _ if lower.starts_with(ADMIN_RESET_PREFIX) => Command::AdminReset(
                text.get(ADMIN_RESET_PREFIX.len()..)
                    .unwrap_or_default()
                    .trim()
                    .to_owned(),
            ),
            _ => Command::Text(text.to_owned()),
        }
    }
}

const ADMIN_RESET_PREFIX: &str = "admin reset ";

pub const HELP_TEXT: &str = "Commands:
register - link your LINE account to your roster name
overtime - open overtime you can take in the next 7 days
status - your binding and today's shift
notifications on / notifications off - opt in or out of broadcasts
help - this list";

/// Handles one message from `line_user_id` and returns the reply.
#[tracing::instrument(name = "Handling conversation command", skip_all)]
pub async fn handle_message(
    state: &AppState,
    line_user_id: &LineUserId,
    text: &str,
) -> Result<String, LeaveAPIError> {
    let command = Command::parse(text);
    let profile = find_profile(state, line_user_id).await?;
    let today = state.clock.today();

    match command {
        Command::Help => Ok(HELP_TEXT.to_owned()),
        Command::Register | Command::Reselect => match profile {
            Some(profile) => Ok(format!(
                "You are already registered as {} (Team {}). Your binding is permanent; ask an administrator to reset it.",
                profile.member_name, profile.team
            )),
            None => {
                let selection = IdentitySelectionState::start(
                    line_user_id.clone(),
                    state.clock.now(),
                );
                save_selection(state, selection).await?;
                Ok(String::from(
                    "Please reply with your full name as it appears on the roster.",
                ))
            }
        },
        Command::QueryOvertime => {
            let (name, fallback) =
                match identity(state, line_user_id, profile).await? {
                    Some(identity) => identity,
                    None => return Ok(not_registered()),
                };
            let open = upcoming_opportunities(
                &*state.leave_store.read().await,
                &name,
                Some(fallback),
                today,
                UPCOMING_OPPORTUNITY_DAYS,
            )
            .await
            .map_err(leave_store_error)?;

            if open.is_empty() {
                return Ok(format!(
                    "No open overtime for you in the next {UPCOMING_OPPORTUNITY_DAYS} days."
                ));
            }
            let lines: Vec<String> = open
                .iter()
                .map(|o| {
                    format!(
                        "{} {} (Team {}, {}): {}",
                        o.date,
                        o.requester_name,
                        o.requester_team,
                        o.period,
                        o.overtime
                    )
                })
                .collect();
            Ok(format!("Open overtime:\n{}", lines.join("\n")))
        }
        Command::Status => match profile {
            Some(profile) => Ok(status_text(&profile, today)),
            None => match find_selection(state, line_user_id).await? {
                Some(selection)
                    if selection.step != IdentityStep::Completed =>
                {
                    Ok(String::from(
                        "Registration in progress. Reply with your name, or \"yes\"/\"no\" to confirm it.",
                    ))
                }
                _ => Ok(not_registered()),
            },
        },
        Command::Notifications(enabled) => match profile {
            Some(_) => {
                state
                    .profile_store
                    .write()
                    .await
                    .set_notification_enabled(line_user_id, enabled)
                    .await
                    .map_err(profile_store_error)?;
                Ok(format!(
                    "Notifications are now {}.",
                    if enabled { "on" } else { "off" }
                ))
            }
            None => Ok(not_registered()),
        },
        Command::AdminReset(name) => {
            admin_reset(state, line_user_id, &name).await
        }
        Command::Yes | Command::No | Command::Text(_) if profile.is_some() => {
            Ok(unknown_command())
        }
        Command::Yes => confirm_selection(state, line_user_id, today).await,
        Command::No => reject_selection(state, line_user_id).await,
        Command::Text(text) => {
            select_name(state, line_user_id, &text, today).await
        }
    }
}

async fn select_name(
    state: &AppState,
    line_user_id: &LineUserId,
    text: &str,
    today: NaiveDate,
) -> Result<String, LeaveAPIError> {
    let mut selection = match find_selection(state, line_user_id).await? {
        Some(selection) if selection.step == IdentityStep::AwaitingName => {
            selection
        }
        Some(selection)
            if selection.step == IdentityStep::AwaitingConfirmation =>
        {
            return Ok(String::from("Please reply \"yes\" or \"no\"."))
        }
        _ => return Ok(unknown_command()),
    };

    let (team, entry) = match roster::roster_for(today).find(text) {
        Some(found) => found,
        None => {
            return Ok(format!(
                "{text} is not on the current roster. Please check the spelling and try again."
            ))
        }
    };
    let name = MemberName::parse(entry.name)?;
    if find_profile_by_name(state, &name).await?.is_some() {
        return Ok(format!("{name} is already linked to another LINE account."));
    }

    selection.step = IdentityStep::AwaitingConfirmation;
    selection.selected_name = Some(name.clone());
    selection.selected_team = Some(team);
    selection.selected_role = Some(entry.role);
    selection.last_activity = state.clock.now();
    save_selection(state, selection).await?;

    Ok(format!(
        "You selected {name} (Team {team}, {}). Reply \"yes\" to confirm or \"no\" to choose again. This cannot be changed later.",
        entry.role
    ))
}

async fn confirm_selection(
    state: &AppState,
    line_user_id: &LineUserId,
    today: NaiveDate,
) -> Result<String, LeaveAPIError> {
    let mut selection = match find_selection(state, line_user_id).await? {
        Some(selection)
            if selection.step == IdentityStep::AwaitingConfirmation =>
        {
            selection
        }
        _ => return Ok(unknown_command()),
    };
    let (name, team, role) = match (
        selection.selected_name.clone(),
        selection.selected_team,
        selection.selected_role,
    ) {
        (Some(name), Some(team), Some(role)) => (name, team, role),
        _ => return reject_selection(state, line_user_id).await,
    };

    let profile = UserProfile {
        line_user_id: line_user_id.clone(),
        display_name: name.to_string(),
        team,
        role,
        member_name: name,
        notification_enabled: true,
    };
    match state.profile_store.write().await.add_profile(profile.clone()).await {
        Ok(()) => {}
        Err(ProfileStoreError::ProfileExists) => {
            return Ok(format!(
                "{} is already linked to another LINE account.",
                profile.member_name
            ))
        }
        Err(e) => return Err(profile_store_error(e)),
    }

    selection.step = IdentityStep::Completed;
    selection.last_activity = state.clock.now();
    save_selection(state, selection).await?;

    Ok(format!(
        "Registration complete. You are {} (Team {}). Notifications are on.\n{}",
        profile.member_name,
        profile.team,
        shift_line(profile.team, today)
    ))
}

async fn reject_selection(
    state: &AppState,
    line_user_id: &LineUserId,
) -> Result<String, LeaveAPIError> {
    match find_selection(state, line_user_id).await? {
        Some(selection) if selection.step != IdentityStep::Completed => {
            let restarted = IdentitySelectionState::start(
                line_user_id.clone(),
                state.clock.now(),
            );
            save_selection(state, restarted).await?;
            Ok(String::from("OK, please send your name again."))
        }
        _ => Ok(unknown_command()),
    }
}

async fn admin_reset(
    state: &AppState,
    line_user_id: &LineUserId,
    name: &str,
) -> Result<String, LeaveAPIError> {
    if !state.config.is_admin(line_user_id) {
        return Ok(String::from("This command is for administrators only."));
    }
    let name = MemberName::parse(name)?;
    let profile = match find_profile_by_name(state, &name).await? {
        Some(profile) => profile,
        None => return Ok(format!("No LINE account is linked to {name}.")),
    };

    state
        .profile_store
        .write()
        .await
        .delete_profile(&profile.line_user_id)
        .await
        .map_err(profile_store_error)?;
    state
        .identity_selection_store
        .write()
        .await
        .delete_state(&profile.line_user_id)
        .await
        .map_err(identity_selection_store_error)?;

    tracing::info!(member = %name, "identity binding reset by administrator");
    Ok(format!("The binding for {name} has been reset."))
}

/// Name plus team and role for someone who finished picking a name, with
/// or without a permanent profile.
async fn identity(
    state: &AppState,
    line_user_id: &LineUserId,
    profile: Option<UserProfile>,
) -> Result<Option<(MemberName, (Team, Role))>, LeaveAPIError> {
    if let Some(profile) = profile {
        return Ok(Some((profile.member_name, (profile.team, profile.role))));
    }
    Ok(find_selection(state, line_user_id)
        .await?
        .filter(|selection| selection.step == IdentityStep::Completed)
        .and_then(|selection| {
            Some((
                selection.selected_name?,
                (selection.selected_team?, selection.selected_role?),
            ))
        }))
}

fn status_text(profile: &UserProfile, today: NaiveDate) -> String {
    format!(
        "Name: {}\nTeam: {} ({})\nNotifications: {}\n{}",
        profile.member_name,
        profile.team,
        profile.role,
        if profile.notification_enabled { "on" } else { "off" },
        shift_line(profile.team, today)
    )
}

fn shift_line(team: Team, today: NaiveDate) -> String {
    format!("Today ({today}) Team {team} is on the {}.", shift_for(team, today))
}

fn not_registered() -> String {
    String::from("You are not registered yet. Send \"register\" to link your LINE account.")
}

fn unknown_command() -> String {
    String::from("Sorry, I did not understand that. Send \"help\" for the list of commands.")
}

async fn find_profile(
    state: &AppState,
    line_user_id: &LineUserId,
) -> Result<Option<UserProfile>, LeaveAPIError> {
    match state
        .profile_store
        .read()
        .await
        .get_profile_by_line_id(line_user_id)
        .await
    {
        Ok(profile) => Ok(Some(profile)),
        Err(ProfileStoreError::ProfileNotFound) => Ok(None),
        Err(e) => Err(profile_store_error(e)),
    }
}

async fn find_profile_by_name(
    state: &AppState,
    name: &MemberName,
) -> Result<Option<UserProfile>, LeaveAPIError> {
    match state
        .profile_store
        .read()
        .await
        .get_profile_by_member_name(name)
        .await
    {
        Ok(profile) => Ok(Some(profile)),
        Err(ProfileStoreError::ProfileNotFound) => Ok(None),
        Err(e) => Err(profile_store_error(e)),
    }
}

async fn find_selection(
    state: &AppState,
    line_user_id: &LineUserId,
) -> Result<Option<IdentitySelectionState>, LeaveAPIError> {
    match state
        .identity_selection_store
        .read()
        .await
        .get_state(line_user_id)
        .await
    {
        Ok(selection) => Ok(Some(selection)),
        Err(IdentitySelectionStoreError::StateNotFound) => Ok(None),
        Err(e) => Err(identity_selection_store_error(e)),
    }
}

async fn save_selection(
    state: &AppState,
    selection: IdentitySelectionState,
) -> Result<(), LeaveAPIError> {
    state
        .identity_selection_store
        .write()
        .await
        .upsert_state(selection)
        .await
        .map_err(identity_selection_store_error)
}
