//! Job sequences produced for each kind of send request.
use crate::{
    domain::tx_request::decode_raw_transaction,
    models::{
        Chain, EthTransaction, InternalData, Job, JobType, OrchestratorError, PrivacyProtocol,
        SendTransactionRequest, TransactionParams, UserInfo,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPipeline {
    Public,
    Raw,
    Eea,
    GoQuorum,
}

impl TransactionPipeline {
    pub fn for_params(params: &TransactionParams) -> Self {
        if params.is_raw() {
            return TransactionPipeline::Raw;
        }
        match params.protocol {
            None => TransactionPipeline::Public,
            Some(PrivacyProtocol::Eea) => TransactionPipeline::Eea,
            Some(PrivacyProtocol::GoQuorum) => TransactionPipeline::GoQuorum,
        }
    }

    /// Builds the unlinked jobs of a request, in execution order.
    pub fn build_jobs(
        &self,
        request: &SendTransactionRequest,
        chain: &Chain,
        user: &UserInfo,
    ) -> Result<Vec<Job>, OrchestratorError> {
        let builder = JobBuilder {
            request,
            chain,
            user,
        };
        match self {
            TransactionPipeline::Public => Ok(vec![builder.public_job()]),
            TransactionPipeline::Raw => Ok(vec![builder.raw_job()?]),
            TransactionPipeline::Eea => Ok(builder.eea_jobs()),
            TransactionPipeline::GoQuorum => Ok(builder.go_quorum_jobs()),
        }
    }
}

struct JobBuilder<'a> {
    request: &'a SendTransactionRequest,
    chain: &'a Chain,
    user: &'a UserInfo,
}

impl JobBuilder<'_> {
    fn params(&self) -> &TransactionParams {
        &self.request.params
    }

    fn job(&self, job_type: JobType, transaction: EthTransaction, internal_data: InternalData) -> Job {
        Job::new("", &self.chain.uuid, job_type, &self.user.tenant_id)
            .with_owner(self.user.username.clone())
            .with_labels(self.request.labels.clone())
            .with_transaction(transaction)
            .with_internal_data(internal_data)
    }

    fn internal_data(&self) -> InternalData {
        let params = self.params();
        let policy = params.retry_policy.as_ref();
        InternalData {
            chain_id: self.chain.chain_id,
            one_time_key: params.one_time_key,
            retry_interval_ms: policy.map(|p| p.interval_ms),
            gas_price_increment: policy.map(|p| p.increment),
            gas_price_limit: policy.map(|p| p.limit),
            ..Default::default()
        }
    }

    fn base_transaction(&self) -> EthTransaction {
        let params = self.params();
        EthTransaction {
            from: params.from.clone(),
            to: params.to.clone(),
            nonce: params.nonce,
            value: params.value,
            gas: params.gas,
            gas_price: params.gas_price,
            gas_fee_cap: params.gas_fee_cap,
            gas_tip_cap: params.gas_tip_cap,
            transaction_type: params.transaction_type,
            data: params.data.clone(),
            ..Default::default()
        }
    }

    fn public_job(&self) -> Job {
        self.job(
            JobType::EthereumTransaction,
            self.base_transaction(),
            self.internal_data(),
        )
    }

    fn raw_job(&self) -> Result<Job, OrchestratorError> {
        let raw = self.params().raw.as_deref().unwrap_or_default();
        let transaction = decode_raw_transaction(raw, self.chain.chain_id)?;
        Ok(self.job(
            JobType::EthereumRawTransaction,
            transaction,
            self.internal_data(),
        ))
    }

    /// Private transaction through the EEA private API, then its privacy marker.
    fn eea_jobs(&self) -> Vec<Job> {
        let params = self.params();
        let private = EthTransaction {
            private_from: params.private_from.clone(),
            private_for: params.private_for.clone(),
            privacy_group_id: params.privacy_group_id.clone(),
            ..self.base_transaction()
        };
        let marking = EthTransaction {
            private_from: params.private_from.clone(),
            private_for: params.private_for.clone(),
            privacy_group_id: params.privacy_group_id.clone(),
            ..Default::default()
        };

        vec![
            self.job(JobType::EeaPrivateTransaction, private, self.internal_data()),
            self.job(
                JobType::EeaMarkingTransaction,
                marking,
                InternalData {
                    chain_id: self.chain.chain_id,
                    one_time_key: true,
                    ..Default::default()
                },
            ),
        ]
    }

    /// Payload stored in Tessera, then the public marking transaction pointing at it.
    fn go_quorum_jobs(&self) -> Vec<Job> {
        let params = self.params();
        let private = EthTransaction {
            private_from: params.private_from.clone(),
            private_for: params.private_for.clone(),
            ..self.base_transaction()
        };
        let marking = EthTransaction {
            data: None,
            private_from: params.private_from.clone(),
            private_for: params.private_for.clone(),
            mandatory_for: params.mandatory_for.clone(),
            privacy_flag: params.privacy_flag,
            ..self.base_transaction()
        };

        vec![
            self.job(JobType::TesseraPrivateTransaction, private, self.internal_data()),
            self.job(JobType::TesseraMarkingTransaction, marking, self.internal_data()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrivacyFlag;

    const FROM: &str = "0x7E654d251Da770A068413677967F6d3Ea2FeA9E4";
    const TO: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn chain() -> Chain {
        Chain {
            uuid: "chain-1".to_string(),
            name: "besu1".to_string(),
            tenant_id: "tenant-1".to_string(),
            chain_id: 888,
            urls: vec!["http://besu1:8545".to_string()],
            private_tx_manager: None,
        }
    }

    fn request(params: TransactionParams) -> SendTransactionRequest {
        SendTransactionRequest {
            idempotency_key: None,
            chain_name: "besu1".to_string(),
            labels: [("app".to_string(), "payments".to_string())].into(),
            params,
        }
    }

    fn user() -> UserInfo {
        UserInfo::new("tenant-1", Some("alice".to_string()))
    }

    #[test]
    fn test_pipeline_selection() {
        let mut params = TransactionParams::default();
        assert_eq!(TransactionPipeline::for_params(&params), TransactionPipeline::Public);

        params.protocol = Some(PrivacyProtocol::Eea);
        assert_eq!(TransactionPipeline::for_params(&params), TransactionPipeline::Eea);

        params.protocol = Some(PrivacyProtocol::GoQuorum);
        assert_eq!(TransactionPipeline::for_params(&params), TransactionPipeline::GoQuorum);

        params.raw = Some("0xf86c".to_string());
        assert_eq!(TransactionPipeline::for_params(&params), TransactionPipeline::Raw);
    }

    #[test]
    fn test_public_job_carries_request_fields() {
        let request = request(TransactionParams {
            from: Some(FROM.to_string()),
            to: Some(TO.to_string()),
            gas_price: Some(1_000),
            retry_policy: Some(crate::models::RetryPolicy {
                interval_ms: 5_000,
                increment: 0.1,
                limit: 0.5,
            }),
            ..Default::default()
        });

        let jobs = TransactionPipeline::Public
            .build_jobs(&request, &chain(), &user())
            .unwrap();

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.job_type, JobType::EthereumTransaction);
        assert_eq!(job.tenant_id, "tenant-1");
        assert_eq!(job.owner_id.as_deref(), Some("alice"));
        assert_eq!(job.labels.get("app").map(String::as_str), Some("payments"));
        assert_eq!(job.transaction.from.as_deref(), Some(FROM));
        assert_eq!(job.internal_data.chain_id, 888);
        assert_eq!(job.internal_data.retry_interval_ms, Some(5_000));
        assert!(job.should_be_retried());
    }

    #[test]
    fn test_eea_marking_job_uses_one_time_key() {
        let request = request(TransactionParams {
            from: Some(FROM.to_string()),
            to: Some(TO.to_string()),
            protocol: Some(PrivacyProtocol::Eea),
            private_from: Some("A1aVtMxLCUHmBVHXoZzzBgPbW/wj5axDpW9X8l91SGo=".to_string()),
            privacy_group_id: Some("group".to_string()),
            ..Default::default()
        });

        let jobs = TransactionPipeline::Eea
            .build_jobs(&request, &chain(), &user())
            .unwrap();

        let types: Vec<JobType> = jobs.iter().map(|job| job.job_type).collect();
        assert_eq!(
            types,
            vec![JobType::EeaPrivateTransaction, JobType::EeaMarkingTransaction]
        );
        assert!(!jobs[0].internal_data.one_time_key);
        assert!(jobs[1].internal_data.one_time_key);
        assert_eq!(jobs[1].transaction.from, None);
        assert_eq!(jobs[1].transaction.privacy_group_id.as_deref(), Some("group"));
    }

    #[test]
    fn test_go_quorum_marking_job_carries_privacy_settings() {
        let request = request(TransactionParams {
            from: Some(FROM.to_string()),
            to: Some(TO.to_string()),
            data: Some("0x01".to_string()),
            protocol: Some(PrivacyProtocol::GoQuorum),
            private_from: Some("sender-key".to_string()),
            private_for: Some(vec!["recipient-key".to_string()]),
            mandatory_for: Some(vec!["recipient-key".to_string()]),
            privacy_flag: Some(PrivacyFlag::MandatoryRecipients),
            ..Default::default()
        });

        let jobs = TransactionPipeline::GoQuorum
            .build_jobs(&request, &chain(), &user())
            .unwrap();

        assert_eq!(jobs[0].job_type, JobType::TesseraPrivateTransaction);
        assert_eq!(jobs[0].transaction.data.as_deref(), Some("0x01"));
        let marking = &jobs[1];
        assert_eq!(marking.job_type, JobType::TesseraMarkingTransaction);
        assert_eq!(marking.transaction.from.as_deref(), Some(FROM));
        assert_eq!(marking.transaction.data, None);
        assert_eq!(marking.transaction.privacy_flag, Some(PrivacyFlag::MandatoryRecipients));
        assert_eq!(
            marking.transaction.mandatory_for,
            Some(vec!["recipient-key".to_string()])
        );
    }

    #[test]
    fn test_raw_pipeline_rejects_undecodable_payload() {
        let request = request(TransactionParams {
            raw: Some("0xdeadbeef".to_string()),
            ..Default::default()
        });

        let result = TransactionPipeline::Raw.build_jobs(&request, &chain(), &user());
        assert!(result.unwrap_err().is_invalid_parameter());
    }
}
