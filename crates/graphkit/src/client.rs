//! Graph API calls: mailbox auto-reply settings and group membership.

use crate::auth::Connection;
use crate::error::{Error, Result};
use crate::types::{AutoReplyConfig, ExternalAudience, ScheduleWindow};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire form of Graph's automaticRepliesSetting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutomaticRepliesSetting {
    status: crate::types::AutoReplyState,
    #[serde(default)]
    external_audience: ExternalAudience,
    #[serde(default)]
    internal_reply_message: String,
    #[serde(default)]
    external_reply_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_start_date_time: Option<DateTimeTimeZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheduled_end_date_time: Option<DateTimeTimeZone>,
}

/// Graph's dateTimeTimeZone pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateTimeTimeZone {
    date_time: String,
    time_zone: String,
}

impl DateTimeTimeZone {
    fn from_utc(dt: DateTime<Utc>) -> Self {
        Self {
            date_time: dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: "UTC".to_string(),
        }
    }

    fn to_utc(&self) -> Option<DateTime<Utc>> {
        // Graph returns fractional seconds ("2026-01-05T08:00:00.0000000");
        // tolerate both forms.
        let trimmed = self.date_time.split('.').next().unwrap_or(&self.date_time);
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl From<&AutoReplyConfig> for AutomaticRepliesSetting {
    fn from(config: &AutoReplyConfig) -> Self {
        Self {
            status: config.state,
            external_audience: config.external_audience,
            internal_reply_message: config.internal_message.clone(),
            external_reply_message: config.external_message.clone(),
            scheduled_start_date_time: config.window.map(|w| DateTimeTimeZone::from_utc(w.start)),
            scheduled_end_date_time: config.window.map(|w| DateTimeTimeZone::from_utc(w.end)),
        }
    }
}

impl AutomaticRepliesSetting {
    fn into_config(self) -> AutoReplyConfig {
        let window = match (&self.scheduled_start_date_time, &self.scheduled_end_date_time) {
            (Some(start), Some(end)) => match (start.to_utc(), end.to_utc()) {
                (Some(start), Some(end)) => Some(ScheduleWindow { start, end }),
                _ => None,
            },
            _ => None,
        };
        AutoReplyConfig {
            state: self.status,
            internal_message: self.internal_reply_message,
            external_message: self.external_reply_message,
            external_audience: self.external_audience,
            window,
        }
    }
}

#[derive(Deserialize)]
struct MailboxSettings {
    #[serde(rename = "automaticRepliesSetting")]
    automatic_replies_setting: AutomaticRepliesSetting,
}

#[derive(Serialize)]
struct MailboxSettingsPatch<'a> {
    #[serde(rename = "automaticRepliesSetting")]
    automatic_replies_setting: &'a AutomaticRepliesSetting,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct GroupRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryMember {
    #[serde(default)]
    user_principal_name: Option<String>,
}

impl Connection {
    /// Read a mailbox's current auto-reply configuration.
    pub fn mailbox_auto_reply(&self, upn: &str) -> Result<AutoReplyConfig> {
        let resource = format!("users/{upn}/mailboxSettings");
        let url = format!("{}/{resource}", self.base);
        let bearer = self.bearer();

        let settings: MailboxSettings = self
            .agent
            .get(&url)
            .query("$select", "automaticRepliesSetting")
            .header("Authorization", bearer.as_str())
            .call()
            .map_err(|e| Error::from_transport(&e, &resource))?
            .body_mut()
            .read_json()
            .map_err(|e| Error::Other(format!("malformed mailboxSettings response: {e}")))?;

        Ok(settings.automatic_replies_setting.into_config())
    }

    /// Write a mailbox's auto-reply configuration.
    pub fn set_mailbox_auto_reply(&self, upn: &str, config: &AutoReplyConfig) -> Result<()> {
        let resource = format!("users/{upn}/mailboxSettings");
        let url = format!("{}/{resource}", self.base);
        let setting = AutomaticRepliesSetting::from(config);
        let bearer = self.bearer();

        self.agent
            .patch(&url)
            .header("Authorization", bearer.as_str())
            .send_json(&MailboxSettingsPatch {
                automatic_replies_setting: &setting,
            })
            .map_err(|e| Error::from_transport(&e, &resource))?;

        Ok(())
    }

    /// List a group's member user principal names, resolving the group by
    /// display name and following paging links.
    ///
    /// Members without a userPrincipalName (nested groups, devices) are
    /// skipped.
    pub fn group_members(&self, group_name: &str) -> Result<Vec<String>> {
        let group_id = self.resolve_group(group_name)?;

        let mut members = Vec::new();
        let mut url = format!("{}/groups/{group_id}/members", self.base);
        let mut first = true;
        let bearer = self.bearer();

        loop {
            let mut request = self.agent.get(&url).header("Authorization", bearer.as_str());
            if first {
                // nextLink URLs already carry the query string.
                request = request
                    .query("$select", "userPrincipalName")
                    .query("$top", "999");
            }

            let page: ListResponse<DirectoryMember> = request
                .call()
                .map_err(|e| Error::from_transport(&e, &format!("groups/{group_name}/members")))?
                .body_mut()
                .read_json()
                .map_err(|e| Error::Other(format!("malformed members response: {e}")))?;

            members.extend(page.value.into_iter().filter_map(|m| m.user_principal_name));

            match page.next_link {
                Some(next) => {
                    url = next;
                    first = false;
                }
                None => break,
            }
        }

        Ok(members)
    }

    fn resolve_group(&self, group_name: &str) -> Result<String> {
        let url = format!("{}/groups", self.base);
        // OData string literals escape single quotes by doubling them.
        let escaped = group_name.replace('\'', "''");
        let bearer = self.bearer();

        let groups: ListResponse<GroupRef> = self
            .agent
            .get(&url)
            .query("$filter", format!("displayName eq '{escaped}'"))
            .query("$select", "id")
            .header("Authorization", bearer.as_str())
            .call()
            .map_err(|e| Error::from_transport(&e, &format!("groups/{group_name}")))?
            .body_mut()
            .read_json()
            .map_err(|e| Error::Other(format!("malformed groups response: {e}")))?;

        groups
            .value
            .into_iter()
            .next()
            .map(|g| g.id)
            .ok_or_else(|| Error::NotFound {
                resource: format!("group '{group_name}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AutoReplyState;
    use chrono::TimeZone;

    #[test]
    fn setting_serializes_to_graph_shape() {
        let config = AutoReplyConfig {
            state: AutoReplyState::Scheduled,
            internal_message: "Out of office".into(),
            external_message: "Away".into(),
            external_audience: ExternalAudience::ContactsOnly,
            window: Some(ScheduleWindow {
                start: Utc.with_ymd_and_hms(2025, 12, 22, 8, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap(),
            }),
        };

        let value = serde_json::to_value(AutomaticRepliesSetting::from(&config)).unwrap();
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["externalAudience"], "contactsOnly");
        assert_eq!(value["internalReplyMessage"], "Out of office");
        assert_eq!(
            value["scheduledStartDateTime"]["dateTime"],
            "2025-12-22T08:00:00"
        );
        assert_eq!(value["scheduledStartDateTime"]["timeZone"], "UTC");
        assert_eq!(value["scheduledEndDateTime"]["dateTime"], "2026-01-05T08:00:00");
    }

    #[test]
    fn disabled_setting_omits_window() {
        let value =
            serde_json::to_value(AutomaticRepliesSetting::from(&AutoReplyConfig::disabled()))
                .unwrap();
        assert_eq!(value["status"], "disabled");
        assert!(value.get("scheduledStartDateTime").is_none());
    }

    #[test]
    fn parses_graph_mailbox_settings() {
        let body = r#"{
            "automaticRepliesSetting": {
                "status": "scheduled",
                "externalAudience": "all",
                "internalReplyMessage": "<html>away</html>",
                "externalReplyMessage": "",
                "scheduledStartDateTime": {
                    "dateTime": "2025-12-22T08:00:00.0000000",
                    "timeZone": "UTC"
                },
                "scheduledEndDateTime": {
                    "dateTime": "2026-01-05T08:00:00.0000000",
                    "timeZone": "UTC"
                }
            }
        }"#;

        let settings: MailboxSettings = serde_json::from_str(body).unwrap();
        let config = settings.automatic_replies_setting.into_config();
        assert_eq!(config.state, AutoReplyState::Scheduled);
        let window = config.window.unwrap();
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2025, 12, 22, 8, 0, 0).unwrap()
        );
        assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap());
    }

    #[test]
    fn parses_member_page_and_skips_non_users() {
        let body = r#"{
            "value": [
                {"userPrincipalName": "a@contoso.com"},
                {"displayName": "Some Device"},
                {"userPrincipalName": "b@contoso.com"}
            ],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/groups/g/members?$skiptoken=x"
        }"#;

        let page: ListResponse<DirectoryMember> = serde_json::from_str(body).unwrap();
        let members: Vec<String> = page
            .value
            .into_iter()
            .filter_map(|m| m.user_principal_name)
            .collect();
        assert_eq!(members, vec!["a@contoso.com", "b@contoso.com"]);
        assert!(page.next_link.is_some());
    }
}
