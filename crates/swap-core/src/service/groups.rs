//! Study groups, membership and invitations.

use tracing::info;

use super::{new_id, now, SkillSwap};
use crate::error::{Result, SwapError};
use crate::events::GroupEvent;
use crate::group::{Group, Invitation, InvitationStatus};
use crate::messaging::GroupMessageKind;
use crate::profile::Profile;
use crate::store::SwapStore;
use crate::validation::{self, MAX_BIO_LENGTH, MAX_GROUP_NAME_LENGTH};

impl<S: SwapStore> SkillSwap<S> {
    /// Create a group with the creator as its first member.
    pub async fn create_group(&self, creator_id: &str, name: &str, description: &str) -> Result<Group> {
        let name = validation::require_text("group name", name, MAX_GROUP_NAME_LENGTH)?;
        let description = description.trim();
        if description.chars().count() > MAX_BIO_LENGTH {
            return Err(validation::ValidationError::TooLong {
                field: "group description".to_string(),
                max: MAX_BIO_LENGTH,
                actual: description.chars().count(),
            }
            .into());
        }
        self.require_profile(creator_id).await?;

        let group = Group {
            id: new_id(),
            name,
            description: description.to_string(),
            members: vec![creator_id.to_string()],
            created_by: creator_id.to_string(),
            created_at: now(),
        };
        self.store.insert_group(&group).await?;
        info!(group_id = %group.id, creator = %creator_id, "Created group");
        Ok(group)
    }

    /// Join a group. Joining twice is a no-op.
    pub async fn join_group(&self, group_id: &str, user_id: &str) -> Result<Group> {
        let profile = self.require_profile(user_id).await?;
        self.require_group(group_id).await?;

        if self.store.add_group_member(group_id, user_id).await? {
            info!(group_id = %group_id, user_id = %user_id, "Joined group");
            let text = format!("{} joined the group", profile.display_name());
            self.post_as(group_id, &profile, text, GroupMessageKind::System).await?;
        }
        self.require_group(group_id).await
    }

    /// Leave a group the user is a member of.
    pub async fn leave_group(&self, group_id: &str, user_id: &str) -> Result<Group> {
        self.require_group(group_id).await?;

        if !self.store.remove_group_member(group_id, user_id).await? {
            return Err(SwapError::Invalid(format!("{} is not a member of {}", user_id, group_id)));
        }
        info!(group_id = %group_id, user_id = %user_id, "Left group");

        self.clear_typing(group_id, user_id).await?;
        if let Some(profile) = self.store.get_profile(user_id).await? {
            let text = format!("{} left the group", profile.display_name());
            self.post_as(group_id, &profile, text, GroupMessageKind::System).await?;
        }
        self.require_group(group_id).await
    }

    /// Delete a group. Only its creator may do this.
    pub async fn delete_group(&self, group_id: &str, user_id: &str) -> Result<()> {
        let group = self.require_group(group_id).await?;
        if group.created_by != user_id {
            return Err(SwapError::Forbidden(
                "only the creator can delete a group".to_string(),
            ));
        }

        self.store.delete_group(group_id).await?;
        self.store.feed().publish(GroupEvent::GroupDeleted {
            group_id: group_id.to_string(),
        });
        info!(group_id = %group_id, "Deleted group");
        Ok(())
    }

    /// Invite a user into a group the inviter belongs to.
    pub async fn invite(&self, group_id: &str, inviter_id: &str, invitee_id: &str) -> Result<Invitation> {
        let group = self.require_group(group_id).await?;
        if !group.is_member(inviter_id) {
            return Err(SwapError::Forbidden(
                "only members can invite to a group".to_string(),
            ));
        }
        self.require_profile(invitee_id).await?;
        if group.is_member(invitee_id) {
            return Err(SwapError::Invalid(format!("{} is already a member", invitee_id)));
        }

        let invitation = Invitation {
            id: new_id(),
            group_id: group.id,
            group_name: group.name,
            inviter_id: inviter_id.to_string(),
            invitee_id: invitee_id.to_string(),
            status: InvitationStatus::Pending,
            created_at: now(),
        };
        self.store.insert_invitation(&invitation).await?;
        info!(invitation_id = %invitation.id, group_id = %group_id, invitee = %invitee_id, "Sent group invitation");
        Ok(invitation)
    }

    pub async fn pending_invitations(&self, user_id: &str) -> Result<Vec<Invitation>> {
        self.store.list_pending_invitations(user_id).await
    }

    /// Accept an invitation and join its group.
    pub async fn accept_invitation(&self, invitation_id: &str, user_id: &str) -> Result<Group> {
        let invitation = self.require_invitation(invitation_id, user_id).await?;
        if invitation.status != InvitationStatus::Pending {
            return Err(SwapError::Invalid("invitation was already accepted".to_string()));
        }

        self.store
            .set_invitation_status(invitation_id, InvitationStatus::Accepted)
            .await?;
        self.join_group(&invitation.group_id, user_id).await
    }

    /// Decline an invitation. Declined invitations are deleted.
    pub async fn decline_invitation(&self, invitation_id: &str, user_id: &str) -> Result<()> {
        self.require_invitation(invitation_id, user_id).await?;
        self.store.delete_invitation(invitation_id).await?;
        info!(invitation_id = %invitation_id, "Declined group invitation");
        Ok(())
    }

    /// All groups, newest first.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.store.list_groups().await
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group> {
        self.require_group(group_id).await
    }

    /// Profiles of a group's members, in join order.
    ///
    /// Members who have closed their account are skipped.
    pub async fn group_members(&self, group_id: &str) -> Result<Vec<Profile>> {
        let group = self.require_group(group_id).await?;

        let mut profiles = Vec::with_capacity(group.members.len());
        for member in &group.members {
            if let Some(profile) = self.store.get_profile(member).await? {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    async fn require_invitation(&self, invitation_id: &str, user_id: &str) -> Result<Invitation> {
        let invitation = self
            .store
            .get_invitation(invitation_id)
            .await?
            .ok_or_else(|| SwapError::not_found("Invitation", invitation_id))?;
        if invitation.invitee_id != user_id {
            return Err(SwapError::Forbidden(
                "only the invitee can answer an invitation".to_string(),
            ));
        }
        Ok(invitation)
    }
}
